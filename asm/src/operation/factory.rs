use super::{
    ConstantDirective, Instruction, MacroDirective, MacroEndDirective, MemoryDefinitionDirective,
    MemoryReservationDirective, Operation, OperationBase, SectionDirective,
};
use crate::{
    error::CompileErrorList,
    position::{CodePositionInterval, PositionedString},
};

/// Operation for a directive, without the leading `.`. Unknown directives
/// are reported and yield `None`.
pub fn create_directive(
    position: CodePositionInterval,
    labels: Vec<PositionedString>,
    name: PositionedString,
    args: &[PositionedString],
    errors: &mut CompileErrorList,
) -> Option<Operation> {
    let key = name.as_str().trim().trim_start_matches('.').to_ascii_lowercase();
    let base = OperationBase::new(position, labels, name);
    let op = match key.as_str() {
        "section" => Operation::Section(SectionDirective::new(base, args)),
        "macro" => Operation::Macro(MacroDirective::new(base, args, errors)),
        "endm" => Operation::MacroEnd(MacroEndDirective { base }),
        "equ" => Operation::Constant(ConstantDirective::new(base, args, errors)),
        "byte" => Operation::Definition(MemoryDefinitionDirective::new(base, args, 1)),
        "half" => Operation::Definition(MemoryDefinitionDirective::new(base, args, 2)),
        "word" => Operation::Definition(MemoryDefinitionDirective::new(base, args, 4)),
        "dword" => Operation::Definition(MemoryDefinitionDirective::new(base, args, 8)),
        "resb" => Operation::Reservation(MemoryReservationDirective::new(base, args, 1)),
        "resh" => Operation::Reservation(MemoryReservationDirective::new(base, args, 2)),
        "resw" => Operation::Reservation(MemoryReservationDirective::new(base, args, 4)),
        "resd" => Operation::Reservation(MemoryReservationDirective::new(base, args, 8)),
        _ => {
            errors.add_error(position, "Unknown directive");
            return None;
        }
    };
    Some(op)
}

/// Instruction or macro call; which one is decided during macro expansion.
pub fn create_instruction(
    position: CodePositionInterval,
    labels: Vec<PositionedString>,
    name: PositionedString,
    operands: &[PositionedString],
) -> Operation {
    Operation::Instruction(Instruction::new(
        OperationBase::new(position, labels, name),
        operands.to_vec(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str, args: &[&str], errors: &mut CompileErrorList) -> Option<Operation> {
        let args: Vec<_> = args.iter().map(|a| PositionedString::unpositioned(a)).collect();
        create_directive(
            CodePositionInterval::default(),
            vec![],
            PositionedString::unpositioned(name),
            &args,
            errors,
        )
    }

    #[test]
    fn test_create() {
        let mut errors = CompileErrorList::new();
        assert!(matches!(create(".section", &["data"], &mut errors), Some(Operation::Section(_))));
        assert!(matches!(create("MACRO", &["m"], &mut errors), Some(Operation::Macro(_))));
        assert!(matches!(create("endm", &[], &mut errors), Some(Operation::MacroEnd(_))));
        assert!(matches!(create("equ", &["N", "1"], &mut errors), Some(Operation::Constant(_))));

        for (name, size) in [("byte", 1), ("half", 2), ("word", 4), ("dword", 8)] {
            match create(name, &["1"], &mut errors) {
                Some(Operation::Definition(d)) => assert_eq!(d.cell_size(), size),
                other => panic!("{name}: {other:?}"),
            }
        }
        for name in ["resb", "resh", "resw", "resd"] {
            assert!(matches!(create(name, &["1"], &mut errors), Some(Operation::Reservation(_))));
        }
        assert!(errors.is_empty());

        assert!(create(".align", &["4"], &mut errors).is_none());
        assert_eq!(errors.messages(), vec!["Unknown directive"]);
    }
}

use rvarch::{Architecture, Machine};
use rvasm::{
    create_directive, create_instruction, CodePositionInterval, CompileErrorList,
    FinalRepresentation, IntermediateRepresentator, PositionedString, TransformationParameters,
};

/// Feeds statements into a representator the way a line parser would, one
/// statement per line.
pub struct Program {
    pub rep: IntermediateRepresentator,
    pub errors: CompileErrorList,
    line: usize,
}

fn positioned(values: &[&str], line: usize) -> Vec<PositionedString> {
    values
        .iter()
        .map(|v| PositionedString::new(v, CodePositionInterval::line(line, 0, v.len())))
        .collect()
}

impl Program {
    pub fn new() -> Self {
        Self {
            rep: IntermediateRepresentator::new(),
            errors: CompileErrorList::new(),
            line: 0,
        }
    }

    fn position(&self) -> CodePositionInterval {
        CodePositionInterval::line(self.line, 0, 20)
    }

    pub fn inst(&mut self, labels: &[&str], name: &str, operands: &[&str]) -> &mut Self {
        let op = create_instruction(
            self.position(),
            positioned(labels, self.line),
            PositionedString::new(name, self.position()),
            &positioned(operands, self.line),
        );
        self.rep.insert_command(op);
        self.line += 1;
        self
    }

    pub fn dir(&mut self, labels: &[&str], name: &str, args: &[&str]) -> &mut Self {
        let op = create_directive(
            self.position(),
            positioned(labels, self.line),
            PositionedString::new(name, self.position()),
            &positioned(args, self.line),
            &mut self.errors,
        );
        if let Some(op) = op {
            self.rep.insert_command(op);
        }
        self.line += 1;
        self
    }

    pub fn compile(&self, arch: Architecture, memory: usize) -> (FinalRepresentation, Machine) {
        let mut machine = Machine::new(&arch, memory);
        let params = TransformationParameters::for_architecture(arch);
        let out = self.rep.transform(&params, self.errors.clone(), &mut machine);
        (out, machine)
    }
}

/// Step until `pc` leaves the program, at most `limit` times.
#[allow(dead_code)]
pub fn run(out: &FinalRepresentation, machine: &mut Machine, limit: usize) -> usize {
    for n in 0..limit {
        match out.step(machine) {
            Ok(Some(_)) => {}
            Ok(None) => return n,
            Err(err) => panic!("step failed: {err}"),
        }
    }
    limit
}

// Fri Jan 16 2026 - Alex

use crate::decompiler::opcode::Opcode;
use once_cell::sync::Lazy;
use regex::Regex;

static INSTRUCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+):\s*([A-Za-z_][A-Za-z0-9_]*)(?:\[([^\]]*)\])?(?:\((.*)\)|\s+(\S.*?))?\s*$")
        .expect("instruction pattern")
});

static LOCAL_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*L(\d+):\s*([A-Za-z_][A-Za-z0-9_]*)\s*:\s*(.+?)\s*,?\s*$")
        .expect("local declaration pattern")
});

static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*B\d+:\s*$").expect("label pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionRecord {
    pub offset: usize,
    pub opcode: Opcode,
    pub operand: Option<String>,
    pub annotation: Option<String>,
}

impl InstructionRecord {
    pub fn new(offset: usize, opcode: Opcode) -> Self {
        Self {
            offset,
            opcode,
            operand: None,
            annotation: None,
        }
    }

    pub fn with_operand(mut self, operand: &str) -> Self {
        self.operand = Some(operand.to_string());
        self
    }

    pub fn with_annotation(mut self, annotation: &str) -> Self {
        self.annotation = Some(annotation.to_string());
        self
    }

    pub fn operand_index(&self) -> Option<usize> {
        self.operand.as_deref().and_then(|o| o.trim().parse().ok())
    }

    /// Annotation if present, otherwise the bracketed operand.
    pub fn argument(&self) -> Option<&str> {
        self.annotation
            .as_deref()
            .or(self.operand.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A `L<n>: name: type` line declaring a local slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDecl {
    pub slot: usize,
    pub name: String,
    pub local_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyLine {
    Instruction(InstructionRecord),
    Local(LocalDecl),
    Label,
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizedBody {
    pub locals: Vec<LocalDecl>,
    pub instructions: Vec<InstructionRecord>,
}

pub fn parse_instruction(line: &str) -> Option<InstructionRecord> {
    let caps = INSTRUCTION_RE.captures(line)?;
    let offset = caps.get(1)?.as_str().parse().ok()?;
    let opcode = Opcode::parse(caps.get(2)?.as_str());

    let mut record = InstructionRecord::new(offset, opcode);
    if let Some(operand) = caps.get(3) {
        record = record.with_operand(operand.as_str().trim());
    }
    if let Some(annotation) = caps.get(4).or_else(|| caps.get(5)) {
        record = record.with_annotation(annotation.as_str().trim());
    }

    Some(record)
}

pub fn classify_line(line: &str) -> BodyLine {
    if LABEL_RE.is_match(line) {
        return BodyLine::Label;
    }

    if let Some(caps) = LOCAL_DECL_RE.captures(line) {
        if let Ok(slot) = caps[1].parse() {
            return BodyLine::Local(LocalDecl {
                slot,
                name: caps[2].to_string(),
                local_type: caps[3].to_string(),
            });
        }
    }

    match parse_instruction(line) {
        Some(record) => BodyLine::Instruction(record),
        None => BodyLine::Other,
    }
}

pub fn tokenize<S: AsRef<str>>(lines: &[S]) -> TokenizedBody {
    let mut body = TokenizedBody::default();

    for line in lines {
        match classify_line(line.as_ref()) {
            BodyLine::Instruction(record) => body.instructions.push(record),
            BodyLine::Local(decl) => body.locals.push(decl),
            BodyLine::Label => {}
            BodyLine::Other => {
                log::trace!("skipping body line: {}", line.as_ref().trim());
            }
        }
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_instruction() {
        let record = parse_instruction("0: MoveLoc[0](Arg0: Coin<SUI>)").unwrap();
        assert_eq!(record.offset, 0);
        assert_eq!(record.opcode, Opcode::MoveLoc);
        assert_eq!(record.operand.as_deref(), Some("0"));
        assert_eq!(record.annotation.as_deref(), Some("Arg0: Coin<SUI>"));
        assert_eq!(record.operand_index(), Some(0));
    }

    #[test]
    fn test_parse_nested_call_annotation() {
        let record = parse_instruction("2: Call(transfer::public_transfer<SUI>(Coin<SUI>,address):())").unwrap();
        assert_eq!(record.opcode, Opcode::Call);
        assert_eq!(record.operand, None);
        assert_eq!(
            record.annotation.as_deref(),
            Some("transfer::public_transfer<SUI>(Coin<SUI>,address):()")
        );
    }

    #[test]
    fn test_parse_spaced_annotation() {
        let record = parse_instruction("\t7: Call coin::value<T>(&Coin<T>): u64").unwrap();
        assert_eq!(record.offset, 7);
        assert_eq!(record.annotation.as_deref(), Some("coin::value<T>(&Coin<T>): u64"));
    }

    #[test]
    fn test_parse_bare_opcode() {
        let record = parse_instruction("  3: Ret").unwrap();
        assert_eq!(record.opcode, Opcode::Ret);
        assert!(record.operand.is_none());
        assert!(record.annotation.is_none());
        assert!(record.argument().is_none());
    }

    #[test]
    fn test_tokenize_mixed_body() {
        let lines = vec![
            "L2:\tloc0: u64",
            "B0:",
            "\t0: LdU64(10)",
            "\t1: StLoc[2](loc0: u64)",
            "this is not an instruction",
            "\t2: Ret",
        ];

        let body = tokenize(&lines);
        assert_eq!(body.locals.len(), 1);
        assert_eq!(body.locals[0].slot, 2);
        assert_eq!(body.locals[0].name, "loc0");
        assert_eq!(body.locals[0].local_type, "u64");
        assert_eq!(body.instructions.len(), 3);
        assert_eq!(body.instructions[0].argument(), Some("10"));
    }
}

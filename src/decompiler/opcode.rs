// Fri Jan 16 2026 - Alex

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntType {
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
}

impl IntType {
    pub fn from_suffix(s: &str) -> Option<Self> {
        match s {
            "U8" => Some(IntType::U8),
            "U16" => Some(IntType::U16),
            "U32" => Some(IntType::U32),
            "U64" => Some(IntType::U64),
            "U128" => Some(IntType::U128),
            "U256" => Some(IntType::U256),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntType::U8 => "u8",
            IntType::U16 => "u16",
            IntType::U32 => "u32",
            IntType::U64 => "u64",
            IntType::U128 => "u128",
            IntType::U256 => "u256",
        }
    }
}

impl fmt::Display for IntType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-operand instructions. All of them pop two values and push one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitOr,
    BitAnd,
    Xor,
    Shl,
    Shr,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Neq,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::BitOr => "|",
            BinaryOp::BitAnd => "&",
            BinaryOp::Xor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    fn from_mnemonic(s: &str) -> Option<Self> {
        let op = match s {
            "Add" => BinaryOp::Add,
            "Sub" => BinaryOp::Sub,
            "Mul" => BinaryOp::Mul,
            "Div" => BinaryOp::Div,
            "Mod" => BinaryOp::Mod,
            "BitOr" => BinaryOp::BitOr,
            "BitAnd" => BinaryOp::BitAnd,
            "Xor" => BinaryOp::Xor,
            "Shl" => BinaryOp::Shl,
            "Shr" => BinaryOp::Shr,
            "Lt" => BinaryOp::Lt,
            "Le" => BinaryOp::Le,
            "Gt" => BinaryOp::Gt,
            "Ge" => BinaryOp::Ge,
            "Eq" => BinaryOp::Eq,
            "Neq" => BinaryOp::Neq,
            "And" => BinaryOp::And,
            "Or" => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }
}

/// One variant per opcode family. `Unknown` keeps the mnemonic so it can
/// be reported; the interpreter skips it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Opcode {
    CopyLoc,
    MoveLoc,
    ImmBorrowLoc,
    MutBorrowLoc,
    StLoc,
    Call,
    Pack,
    Unpack,
    Ret,
    FreezeRef,
    LdInt(IntType),
    LdTrue,
    LdFalse,
    LdConst,
    Pop,
    BrTrue,
    BrFalse,
    Branch,
    Abort,
    ImmBorrowField,
    MutBorrowField,
    ReadRef,
    WriteRef,
    Binary(BinaryOp),
    Not,
    Cast(IntType),
    VecPack,
    VecLen,
    VecImmBorrow,
    VecMutBorrow,
    VecPushBack,
    VecPopBack,
    VecUnpack,
    VecSwap,
    Exists,
    MoveFrom,
    MoveTo,
    ImmBorrowGlobal,
    MutBorrowGlobal,
    Nop,
    Unknown(String),
}

impl Opcode {
    pub fn parse(mnemonic: &str) -> Self {
        let mnemonic = mnemonic.trim();
        let base = mnemonic.strip_suffix("Generic").unwrap_or(mnemonic);

        if let Some(op) = BinaryOp::from_mnemonic(base) {
            return Opcode::Binary(op);
        }
        if let Some(ty) = base.strip_prefix("Ld").and_then(IntType::from_suffix) {
            return Opcode::LdInt(ty);
        }
        if let Some(ty) = base.strip_prefix("Cast").and_then(IntType::from_suffix) {
            return Opcode::Cast(ty);
        }

        match base {
            "CopyLoc" => Opcode::CopyLoc,
            "MoveLoc" => Opcode::MoveLoc,
            "ImmBorrowLoc" => Opcode::ImmBorrowLoc,
            "MutBorrowLoc" => Opcode::MutBorrowLoc,
            "StLoc" => Opcode::StLoc,
            "Call" => Opcode::Call,
            "Pack" => Opcode::Pack,
            "Unpack" => Opcode::Unpack,
            "Ret" => Opcode::Ret,
            "FreezeRef" => Opcode::FreezeRef,
            "LdTrue" => Opcode::LdTrue,
            "LdFalse" => Opcode::LdFalse,
            "LdConst" => Opcode::LdConst,
            "Pop" => Opcode::Pop,
            "BrTrue" => Opcode::BrTrue,
            "BrFalse" => Opcode::BrFalse,
            "Branch" => Opcode::Branch,
            "Abort" => Opcode::Abort,
            "ImmBorrowField" => Opcode::ImmBorrowField,
            "MutBorrowField" => Opcode::MutBorrowField,
            "ReadRef" => Opcode::ReadRef,
            "WriteRef" => Opcode::WriteRef,
            "Not" => Opcode::Not,
            "VecPack" => Opcode::VecPack,
            "VecLen" => Opcode::VecLen,
            "VecImmBorrow" => Opcode::VecImmBorrow,
            "VecMutBorrow" => Opcode::VecMutBorrow,
            "VecPushBack" => Opcode::VecPushBack,
            "VecPopBack" => Opcode::VecPopBack,
            "VecUnpack" => Opcode::VecUnpack,
            "VecSwap" => Opcode::VecSwap,
            "Exists" => Opcode::Exists,
            "MoveFrom" => Opcode::MoveFrom,
            "MoveTo" => Opcode::MoveTo,
            "ImmBorrowGlobal" => Opcode::ImmBorrowGlobal,
            "MutBorrowGlobal" => Opcode::MutBorrowGlobal,
            "Nop" => Opcode::Nop,
            _ => Opcode::Unknown(mnemonic.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Opcode::Unknown(_))
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Opcode::BrTrue | Opcode::BrFalse | Opcode::Branch)
    }

    /// Family name used for statistics and fallback annotations.
    pub fn family(&self) -> &str {
        match self {
            Opcode::CopyLoc | Opcode::MoveLoc => "local-read",
            Opcode::ImmBorrowLoc | Opcode::MutBorrowLoc => "local-borrow",
            Opcode::StLoc => "local-store",
            Opcode::Call => "call",
            Opcode::Pack | Opcode::Unpack => "struct",
            Opcode::Ret => "return",
            Opcode::FreezeRef | Opcode::ReadRef | Opcode::WriteRef => "reference",
            Opcode::LdInt(_) | Opcode::LdTrue | Opcode::LdFalse | Opcode::LdConst => "constant",
            Opcode::Pop | Opcode::Nop => "stack",
            Opcode::BrTrue | Opcode::BrFalse | Opcode::Branch => "branch",
            Opcode::Abort => "abort",
            Opcode::ImmBorrowField | Opcode::MutBorrowField => "field-borrow",
            Opcode::Binary(_) | Opcode::Not => "operator",
            Opcode::Cast(_) => "cast",
            Opcode::VecPack
            | Opcode::VecLen
            | Opcode::VecImmBorrow
            | Opcode::VecMutBorrow
            | Opcode::VecPushBack
            | Opcode::VecPopBack
            | Opcode::VecUnpack
            | Opcode::VecSwap => "vector",
            Opcode::Exists
            | Opcode::MoveFrom
            | Opcode::MoveTo
            | Opcode::ImmBorrowGlobal
            | Opcode::MutBorrowGlobal => "global",
            Opcode::Unknown(_) => "unknown",
        }
    }

    /// Short explanation used by the annotated fallback listing.
    pub fn describe(&self) -> String {
        match self {
            Opcode::CopyLoc => "copy local onto the stack".to_string(),
            Opcode::MoveLoc => "move local onto the stack".to_string(),
            Opcode::ImmBorrowLoc => "push immutable reference to local".to_string(),
            Opcode::MutBorrowLoc => "push mutable reference to local".to_string(),
            Opcode::StLoc => "pop value into local".to_string(),
            Opcode::Call => "call function with stack arguments".to_string(),
            Opcode::Pack => "build struct from stack values".to_string(),
            Opcode::Unpack => "destructure struct onto the stack".to_string(),
            Opcode::Ret => "return from function".to_string(),
            Opcode::FreezeRef => "turn mutable reference into immutable".to_string(),
            Opcode::LdInt(ty) => format!("push {} literal", ty),
            Opcode::LdTrue => "push true".to_string(),
            Opcode::LdFalse => "push false".to_string(),
            Opcode::LdConst => "push constant from pool".to_string(),
            Opcode::Pop => "discard top of stack".to_string(),
            Opcode::BrTrue => "branch if true".to_string(),
            Opcode::BrFalse => "branch if false".to_string(),
            Opcode::Branch => "unconditional branch".to_string(),
            Opcode::Abort => "abort with error code".to_string(),
            Opcode::ImmBorrowField => "borrow field immutably".to_string(),
            Opcode::MutBorrowField => "borrow field mutably".to_string(),
            Opcode::ReadRef => "read through reference".to_string(),
            Opcode::WriteRef => "write through reference".to_string(),
            Opcode::Binary(op) => format!("binary operator {}", op.symbol()),
            Opcode::Not => "logical not".to_string(),
            Opcode::Cast(ty) => format!("cast to {}", ty),
            Opcode::VecPack => "build vector from stack values".to_string(),
            Opcode::VecLen => "vector length".to_string(),
            Opcode::VecImmBorrow => "borrow vector element".to_string(),
            Opcode::VecMutBorrow => "borrow vector element mutably".to_string(),
            Opcode::VecPushBack => "append to vector".to_string(),
            Opcode::VecPopBack => "remove last vector element".to_string(),
            Opcode::VecUnpack => "spread vector onto the stack".to_string(),
            Opcode::VecSwap => "swap vector elements".to_string(),
            Opcode::Exists => "check global resource exists".to_string(),
            Opcode::MoveFrom => "move resource out of global storage".to_string(),
            Opcode::MoveTo => "publish resource to global storage".to_string(),
            Opcode::ImmBorrowGlobal => "borrow global resource".to_string(),
            Opcode::MutBorrowGlobal => "borrow global resource mutably".to_string(),
            Opcode::Nop => "no operation".to_string(),
            Opcode::Unknown(name) => format!("unrecognized opcode {}", name),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::LdInt(ty) => write!(f, "Ld{}", ty.as_str().to_uppercase()),
            Opcode::Cast(ty) => write!(f, "Cast{}", ty.as_str().to_uppercase()),
            Opcode::Binary(op) => write!(f, "{:?}", op),
            Opcode::Unknown(name) => f.write_str(name),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Constant operand stored in a function's literal pool.
///
/// Literals are plain data so a descriptor can be copied into another
/// context without touching the heap it was compiled in.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    // Load operations
    LoadLiteral(u8, u32),            // LoadLiteral(dest_reg, literal_idx)
    LoadLocal(u8, u8),               // LoadLocal(dest_reg, src_reg)
    LoadArg(u8, u8),                 // LoadArg(dest_reg, param_idx)
    LoadStatic(u8, u32),             // LoadStatic(dest_reg, static_idx)
    LoadGlobal(u8, u32),             // LoadGlobal(dest_reg, name_literal_idx)

    // Store operations
    StoreLocal(u8, u8),              // StoreLocal(src_reg, dest_reg)
    StoreStatic(u8, u32),            // StoreStatic(src_reg, static_idx)

    // Arithmetic
    Add(u8, u8, u8),                 // Add(dest_reg, lhs_reg, rhs_reg)
    Sub(u8, u8, u8),
    Mul(u8, u8, u8),
    Div(u8, u8, u8),
    Concat(u8, u8, u8),

    // Function calls
    Call(u8, u8, u8),                // Call(func_reg, arg_count, result_reg)
    Return(Option<u8>),              // Return(opt_value_reg)

    // Control flow
    Jump(i16),                       // Jump(offset)
    JumpIfTrue(u8, i16),             // JumpIfTrue(test_reg, offset)
    JumpIfFalse(u8, i16),            // JumpIfFalse(test_reg, offset)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub by_reference: bool,
    pub default: Option<Literal>,
}

/// Compiled representation of a user function.
///
/// `Clone` is a full deep copy; nothing in here points back into the
/// context that compiled it.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDescriptor {
    pub name: String,
    pub scope: Option<String>,
    pub filename: Option<String>,
    pub line_start: u32,
    pub line_end: u32,
    pub params: Vec<Parameter>,
    pub literals: Vec<Literal>,
    pub static_variables: Vec<(String, Literal)>,
    pub instructions: Vec<Instruction>,
    pub register_count: u8,
}

impl FunctionDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: None,
            filename: None,
            line_start: 0,
            line_end: 0,
            params: Vec::new(),
            literals: Vec::new(),
            static_variables: Vec::new(),
            instructions: Vec::new(),
            register_count: 0,
        }
    }

    pub fn with_scope(mut self, class_name: impl Into<String>) -> Self {
        self.scope = Some(class_name.into());
        self
    }

    pub fn with_location(mut self, filename: impl Into<String>, line_start: u32, line_end: u32) -> Self {
        self.filename = Some(filename.into());
        self.line_start = line_start;
        self.line_end = line_end;
        self
    }

    pub fn with_param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Parameter {
            name: name.into(),
            by_reference: false,
            default: None,
        });
        self
    }

    pub fn add_literal(&mut self, literal: Literal) -> u32 {
        if let Some(idx) = self.literals.iter().position(|l| *l == literal) {
            return idx as u32;
        }
        self.literals.push(literal);
        (self.literals.len() - 1) as u32
    }

    pub fn emit(&mut self, instruction: Instruction) {
        if let Some(reg) = instruction.dest_register() {
            self.register_count = self.register_count.max(reg.saturating_add(1));
        }
        self.instructions.push(instruction);
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl Instruction {
    fn dest_register(&self) -> Option<u8> {
        match self {
            Instruction::LoadLiteral(dest, _)
            | Instruction::LoadLocal(dest, _)
            | Instruction::LoadArg(dest, _)
            | Instruction::LoadStatic(dest, _)
            | Instruction::LoadGlobal(dest, _)
            | Instruction::StoreLocal(_, dest)
            | Instruction::Add(dest, _, _)
            | Instruction::Sub(dest, _, _)
            | Instruction::Mul(dest, _, _)
            | Instruction::Div(dest, _, _)
            | Instruction::Concat(dest, _, _)
            | Instruction::Call(_, _, dest) => Some(*dest),
            _ => None,
        }
    }
}

use crate::parser::{BinaryOp, Expr, Program, Stmt};
use wafer::bytecode::{BinOp, Instruction};

/// Sentinel target written into a forward jump before the jumped-to
/// position is known. Backward jumps never need it.
const UNPATCHED: usize = usize::MAX;

/// Lower a whole program to an executable instruction sequence.
pub fn lower(program: &Program) -> Result<Vec<Instruction>, LoweringError> {
    Lowering::new().lower_program(program)
}

/// Walks the syntax tree and appends IL instructions to a growing
/// sequence, patching forward jump targets as each construct closes.
pub struct Lowering {
    instructions: Vec<Instruction>,
}

impl Lowering {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
        }
    }

    /// Lower the top-level statement sequence and terminate it with `Halt`.
    ///
    /// The value of a trailing expression statement is left on the stack
    /// as the program result; every other expression statement is popped,
    /// so a program without a trailing expression halts with an empty
    /// stack.
    pub fn lower_program(mut self, program: &Program) -> Result<Vec<Instruction>, LoweringError> {
        let count = program.statements.len();
        for (i, statement) in program.statements.iter().enumerate() {
            let keep_value = i + 1 == count;
            self.lower_statement(statement, keep_value)?;
        }
        self.emit(Instruction::Halt);
        Ok(self.instructions)
    }

    fn lower_statement(&mut self, statement: &Stmt, keep_value: bool) -> Result<(), LoweringError> {
        match statement {
            Stmt::Assignment { name, value, .. } => {
                self.lower_expression(value);
                self.emit(Instruction::StoreVar(name.clone()));
            }

            Stmt::Expression { expr, .. } => {
                self.lower_expression(expr);
                if !keep_value {
                    self.emit(Instruction::Pop);
                }
            }

            Stmt::While {
                condition,
                body,
                else_body,
                line,
            } => {
                self.reject_else(else_body, "while-else", *line)?;

                // The loop continues while the condition is non-zero.
                let loop_start = self.instructions.len();
                self.lower_expression(condition);
                let exit_jump = self.emit_placeholder(Instruction::JumpIfZero(UNPATCHED));
                for statement in body {
                    self.lower_statement(statement, false)?;
                }
                self.emit(Instruction::Jump(loop_start));
                self.patch(exit_jump);
            }

            Stmt::If {
                condition,
                body,
                else_body,
                line,
            } => {
                self.reject_else(else_body, "if-else", *line)?;

                // The branch is taken only when the condition is exactly 1.
                // This is intentionally asymmetric with the while test.
                self.lower_expression(condition);
                let skip_jump = self.emit_placeholder(Instruction::JumpIfNotOne(UNPATCHED));
                for statement in body {
                    self.lower_statement(statement, false)?;
                }
                self.patch(skip_jump);
            }
        }
        Ok(())
    }

    fn lower_expression(&mut self, expr: &Expr) {
        match expr {
            Expr::Number(value) => self.emit(Instruction::PushConst(*value)),

            Expr::Identifier(name) => self.emit(Instruction::LoadVar(name.clone())),

            Expr::Binary {
                left,
                operator,
                right,
                ..
            } => {
                // Left before right, permanently.
                self.lower_expression(left);
                self.lower_expression(right);
                self.emit(Instruction::BinOp(lower_operator(*operator)));
            }

            Expr::Call {
                name, arguments, ..
            } => {
                for argument in arguments {
                    self.lower_expression(argument);
                }
                self.emit(Instruction::Call {
                    name: name.clone(),
                    argc: arguments.len(),
                });
            }
        }
    }

    fn reject_else(
        &self,
        else_body: &[Stmt],
        construct: &str,
        line: usize,
    ) -> Result<(), LoweringError> {
        if else_body.is_empty() {
            Ok(())
        } else {
            Err(LoweringError::UnsupportedConstruct {
                construct: construct.to_string(),
                line,
            })
        }
    }

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Emit a jump whose target is not yet known; returns its index so the
    /// caller can patch it once the target position exists.
    fn emit_placeholder(&mut self, instruction: Instruction) -> usize {
        let index = self.instructions.len();
        self.instructions.push(instruction);
        index
    }

    /// Point the placeholder at `index` to the current end of the sequence.
    fn patch(&mut self, index: usize) {
        let target = self.instructions.len();
        match &mut self.instructions[index] {
            Instruction::Jump(t)
            | Instruction::JumpIfZero(t)
            | Instruction::JumpIfNotOne(t) => *t = target,
            other => unreachable!("patched a non-jump instruction: {}", other),
        }
    }
}

impl Default for Lowering {
    fn default() -> Self {
        Self::new()
    }
}

fn lower_operator(operator: BinaryOp) -> BinOp {
    match operator {
        BinaryOp::Add => BinOp::Add,
        BinaryOp::Subtract => BinOp::Sub,
        BinaryOp::Multiply => BinOp::Mul,
        BinaryOp::Divide => BinOp::Div,
        BinaryOp::Modulo => BinOp::Mod,
        BinaryOp::Equal => BinOp::Eq,
        BinaryOp::NotEqual => BinOp::Ne,
        BinaryOp::Less => BinOp::Lt,
        BinaryOp::Greater => BinOp::Gt,
        BinaryOp::LessEqual => BinOp::Le,
        BinaryOp::GreaterEqual => BinOp::Ge,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoweringError {
    #[error("Unsupported construct '{construct}' at line {line}")]
    UnsupportedConstruct { construct: String, line: usize },
}

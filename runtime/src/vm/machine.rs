use rustc_hash::FxHashMap;

use crate::bytecode::{BinOp, Instruction};
use crate::vm::{MachineConfig, Registry, VmError, VmResult};

/// The stack machine that executes an IL instruction sequence.
///
/// Program counter, operand stack, and variable environment are all
/// explicit fields of the machine; no state survives between separate
/// program runs. Every value is an `i64` - the IL has no other value kind.
#[derive(Debug)]
pub struct Machine {
    instructions: Vec<Instruction>,
    registry: Registry,
    config: MachineConfig,
    pc: usize,
    stack: Vec<i64>,
    env: FxHashMap<String, i64>,
    steps: u64,
}

impl Machine {
    /// Create a machine with default configuration
    pub fn new(instructions: Vec<Instruction>, registry: Registry) -> Self {
        Self::with_config(instructions, registry, MachineConfig::default())
    }

    /// Create a machine with the given configuration
    pub fn with_config(
        instructions: Vec<Instruction>,
        registry: Registry,
        config: MachineConfig,
    ) -> Self {
        Self {
            instructions,
            registry,
            config,
            pc: 0,
            stack: Vec::with_capacity(64),
            env: FxHashMap::default(),
            steps: 0,
        }
    }

    /// The variable environment, for inspection after a run
    pub fn environment(&self) -> &FxHashMap<String, i64> {
        &self.env
    }

    /// Current operand stack depth
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Execute until `Halt`, the end of the sequence, or a fault.
    ///
    /// On success returns the final top-of-stack value, if the program left
    /// one. The final environment stays available through
    /// [`Machine::environment`].
    pub fn run(&mut self) -> VmResult<Option<i64>> {
        while self.pc < self.instructions.len() {
            if let Some(limit) = self.config.step_limit {
                if self.steps >= limit {
                    return Err(VmError::StepLimitExceeded { limit });
                }
            }
            self.steps += 1;

            let instruction = self.instructions[self.pc].clone();
            if self.config.trace {
                self.print_state(&instruction);
            }

            match instruction {
                Instruction::PushConst(value) => self.stack.push(value),

                Instruction::LoadVar(name) => {
                    let value = *self.env.get(&name).ok_or_else(|| VmError::UnboundVariable {
                        name: name.clone(),
                        pc: self.pc,
                    })?;
                    self.stack.push(value);
                }

                Instruction::StoreVar(name) => {
                    let value = self.pop()?;
                    self.env.insert(name, value);
                }

                Instruction::BinOp(op) => {
                    let right = self.pop()?;
                    let left = self.pop()?;
                    let result = self.apply(op, left, right)?;
                    self.stack.push(result);
                }

                Instruction::Call { name, argc } => {
                    let callable =
                        *self.registry.get(&name).ok_or_else(|| VmError::UnknownCallable {
                            name: name.clone(),
                            pc: self.pc,
                        })?;
                    if callable.arity != argc {
                        return Err(VmError::ArityMismatch {
                            name,
                            expected: callable.arity,
                            found: argc,
                            pc: self.pc,
                        });
                    }

                    // Arguments come off the stack in reverse push order;
                    // reversing restores the source's left-to-right order.
                    let mut args = Vec::with_capacity(argc);
                    for _ in 0..argc {
                        args.push(self.pop()?);
                    }
                    args.reverse();

                    self.stack.push((callable.func)(&args));
                }

                Instruction::Jump(target) => {
                    self.jump(target)?;
                    continue;
                }

                Instruction::JumpIfZero(target) => {
                    let value = self.pop()?;
                    if value == 0 {
                        self.jump(target)?;
                        continue;
                    }
                }

                Instruction::JumpIfNotOne(target) => {
                    let value = self.pop()?;
                    if value != 1 {
                        self.jump(target)?;
                        continue;
                    }
                }

                Instruction::Pop => {
                    self.pop()?;
                }

                Instruction::Halt => return Ok(self.stack.pop()),
            }

            self.pc += 1;
        }

        Ok(self.stack.pop())
    }

    fn pop(&mut self) -> VmResult<i64> {
        self.stack.pop().ok_or(VmError::StackUnderflow { pc: self.pc })
    }

    fn jump(&mut self, target: usize) -> VmResult<()> {
        // target == len() is allowed; the dispatch loop then terminates.
        if target > self.instructions.len() {
            return Err(VmError::InvalidJumpTarget {
                target,
                pc: self.pc,
            });
        }
        self.pc = target;
        Ok(())
    }

    /// Division and modulo truncate toward zero; the rest of the
    /// arithmetic wraps, which also keeps `i64::MIN / -1` defined.
    fn apply(&self, op: BinOp, left: i64, right: i64) -> VmResult<i64> {
        let result = match op {
            BinOp::Add => left.wrapping_add(right),
            BinOp::Sub => left.wrapping_sub(right),
            BinOp::Mul => left.wrapping_mul(right),
            BinOp::Div => {
                if right == 0 {
                    return Err(VmError::DivisionByZero { pc: self.pc });
                }
                left.wrapping_div(right)
            }
            BinOp::Mod => {
                if right == 0 {
                    return Err(VmError::DivisionByZero { pc: self.pc });
                }
                left.wrapping_rem(right)
            }
            BinOp::Eq => (left == right) as i64,
            BinOp::Ne => (left != right) as i64,
            BinOp::Lt => (left < right) as i64,
            BinOp::Gt => (left > right) as i64,
            BinOp::Le => (left <= right) as i64,
            BinOp::Ge => (left >= right) as i64,
        };
        Ok(result)
    }

    fn print_state(&self, instruction: &Instruction) {
        let stack: Vec<String> = self.stack.iter().map(i64::to_string).collect();
        println!("INS {:04} {}", self.pc, instruction);
        println!("STK [{}]", stack.join(" "));
    }
}

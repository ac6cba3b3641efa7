//! Utility helpers for the wafer runtime

use crate::bytecode::{BinOp, Instruction};

/// Render an instruction sequence as a numbered listing, one instruction
/// per line, suitable for printing before a run.
pub fn disassemble(instructions: &[Instruction]) -> String {
    let mut listing = String::new();
    for (index, instruction) in instructions.iter().enumerate() {
        listing.push_str(&format!("{:04} {}\n", index, instruction));
    }
    listing
}

/// Hand-assembled demonstration program:
///
/// ```text
/// x = 5
/// total = 0
/// while x:
///     total = total + x
///     x = x - 1
/// print(total)
/// ```
pub fn generate_demo_program() -> Vec<Instruction> {
    vec![
        /* 0000 */ Instruction::PushConst(5),
        /* 0001 */ Instruction::StoreVar("x".to_string()),
        /* 0002 */ Instruction::PushConst(0),
        /* 0003 */ Instruction::StoreVar("total".to_string()),
        /* 0004 */ Instruction::LoadVar("x".to_string()), // loop start
        /* 0005 */ Instruction::JumpIfZero(15),
        /* 0006 */ Instruction::LoadVar("total".to_string()),
        /* 0007 */ Instruction::LoadVar("x".to_string()),
        /* 0008 */ Instruction::BinOp(BinOp::Add),
        /* 0009 */ Instruction::StoreVar("total".to_string()),
        /* 0010 */ Instruction::LoadVar("x".to_string()),
        /* 0011 */ Instruction::PushConst(1),
        /* 0012 */ Instruction::BinOp(BinOp::Sub),
        /* 0013 */ Instruction::StoreVar("x".to_string()),
        /* 0014 */ Instruction::Jump(4),
        /* 0015 */ Instruction::LoadVar("total".to_string()),
        /* 0016 */ Instruction::Call { name: "print".to_string(), argc: 1 },
        /* 0017 */ Instruction::Halt,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::{Machine, Registry};

    #[test]
    fn test_disassemble_format() {
        let listing = disassemble(&[
            Instruction::PushConst(5),
            Instruction::JumpIfZero(15),
            Instruction::Halt,
        ]);
        assert_eq!(listing, "0000 PushConst 5\n0001 JumpIfZero 15\n0002 Halt\n");
    }

    #[test]
    fn test_demo_program_runs() {
        let mut machine = Machine::new(generate_demo_program(), Registry::with_builtins());
        let result = machine.run().unwrap();
        assert_eq!(result, Some(15));
        assert_eq!(machine.environment().get("x"), Some(&0));
        assert_eq!(machine.environment().get("total"), Some(&15));
    }
}

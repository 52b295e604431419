//! Single-cycle integer operations.

use crate::isa::OpCode;

/// Computes a register-register or register-immediate ALU result.
///
/// For immediate forms the caller passes the immediate as `b`. Shift amounts
/// take the low five bits of `b` per the RV32 spec.
pub fn alu(op: OpCode, a: u32, b: u32) -> u32 {
    match op {
        OpCode::Add | OpCode::Addi => a.wrapping_add(b),
        OpCode::Sub => a.wrapping_sub(b),
        OpCode::Sll | OpCode::Slli => a << (b & 0x1F),
        OpCode::Slt | OpCode::Slti => u32::from((a as i32) < (b as i32)),
        OpCode::Sltu | OpCode::Sltiu => u32::from(a < b),
        OpCode::Xor | OpCode::Xori => a ^ b,
        OpCode::Srl | OpCode::Srli => a >> (b & 0x1F),
        OpCode::Sra | OpCode::Srai => ((a as i32) >> (b & 0x1F)) as u32,
        OpCode::Or | OpCode::Ori => a | b,
        OpCode::And | OpCode::Andi => a & b,
        _ => 0,
    }
}

/// Evaluates a conditional-branch condition.
pub fn branch_taken(op: OpCode, a: u32, b: u32) -> bool {
    match op {
        OpCode::Beq => a == b,
        OpCode::Bne => a != b,
        OpCode::Blt => (a as i32) < (b as i32),
        OpCode::Bge => (a as i32) >= (b as i32),
        OpCode::Bltu => a < b,
        OpCode::Bgeu => a >= b,
        _ => false,
    }
}

/// Applies an AMO's arithmetic step to the loaded value and `rs2`.
pub fn amo(op: OpCode, loaded: u32, src: u32) -> u32 {
    match op {
        OpCode::AmoSwapW => src,
        OpCode::AmoAddW => loaded.wrapping_add(src),
        OpCode::AmoXorW => loaded ^ src,
        OpCode::AmoAndW => loaded & src,
        OpCode::AmoOrW => loaded | src,
        OpCode::AmoMinW => (loaded as i32).min(src as i32) as u32,
        OpCode::AmoMaxW => (loaded as i32).max(src as i32) as u32,
        OpCode::AmoMinuW => loaded.min(src),
        OpCode::AmoMaxuW => loaded.max(src),
        _ => loaded,
    }
}

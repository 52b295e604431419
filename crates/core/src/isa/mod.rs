//! Instruction set definitions and decoding.
//!
//! This module covers the RV32 instruction set handled by the core. It
//! provides:
//! 1. **Opcodes:** The internal operation enum for RV32I/M/A/Zicsr/Zifencei.
//! 2. **Decode:** Raw 32-bit encodings to [`DecodedOp`], never failing; bad
//!    encodings become [`OpCode::Illegal`] and trap at execute.
//! 3. **RVC:** Expansion of 16-bit compressed encodings to their 32-bit
//!    equivalents.

pub mod decode;
pub mod rvc;

pub use decode::decode;

/// Internal operation identifiers for the supported RV32 instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum OpCode {
    // RV32I
    Lui,
    Auipc,
    Jal,
    Jalr,
    Beq,
    Bne,
    Blt,
    Bge,
    Bltu,
    Bgeu,
    Lb,
    Lh,
    Lw,
    Lbu,
    Lhu,
    Sb,
    Sh,
    Sw,
    Addi,
    Slti,
    Sltiu,
    Xori,
    Ori,
    Andi,
    Slli,
    Srli,
    Srai,
    Add,
    Sub,
    Sll,
    Slt,
    Sltu,
    Xor,
    Srl,
    Sra,
    Or,
    And,
    Fence,
    FenceI,
    Ecall,
    Ebreak,
    Mret,
    Wfi,
    // Zicsr
    Csrrw,
    Csrrs,
    Csrrc,
    Csrrwi,
    Csrrsi,
    Csrrci,
    // RV32M
    Mul,
    Mulh,
    Mulhsu,
    Mulhu,
    Div,
    Divu,
    Rem,
    Remu,
    // RV32A
    LrW,
    ScW,
    AmoSwapW,
    AmoAddW,
    AmoXorW,
    AmoAndW,
    AmoOrW,
    AmoMinW,
    AmoMaxW,
    AmoMinuW,
    AmoMaxuW,
    /// Unrecognized encoding; raises an illegal-instruction trap at execute.
    Illegal,
}

impl OpCode {
    /// Whether this operation reads the `rs1` register field.
    ///
    /// The immediate CSR forms carry `zimm` in the `rs1` field, so they do
    /// not read a register through it.
    pub fn reads_rs1(self) -> bool {
        !matches!(
            self,
            OpCode::Lui
                | OpCode::Auipc
                | OpCode::Jal
                | OpCode::Fence
                | OpCode::FenceI
                | OpCode::Ecall
                | OpCode::Ebreak
                | OpCode::Mret
                | OpCode::Wfi
                | OpCode::Csrrwi
                | OpCode::Csrrsi
                | OpCode::Csrrci
                | OpCode::Illegal
        )
    }

    /// Whether this operation reads the `rs2` register field.
    pub fn reads_rs2(self) -> bool {
        matches!(
            self,
            OpCode::Beq
                | OpCode::Bne
                | OpCode::Blt
                | OpCode::Bge
                | OpCode::Bltu
                | OpCode::Bgeu
                | OpCode::Sb
                | OpCode::Sh
                | OpCode::Sw
                | OpCode::Add
                | OpCode::Sub
                | OpCode::Sll
                | OpCode::Slt
                | OpCode::Sltu
                | OpCode::Xor
                | OpCode::Srl
                | OpCode::Sra
                | OpCode::Or
                | OpCode::And
                | OpCode::Mul
                | OpCode::Mulh
                | OpCode::Mulhsu
                | OpCode::Mulhu
                | OpCode::Div
                | OpCode::Divu
                | OpCode::Rem
                | OpCode::Remu
                | OpCode::ScW
                | OpCode::AmoSwapW
                | OpCode::AmoAddW
                | OpCode::AmoXorW
                | OpCode::AmoAndW
                | OpCode::AmoOrW
                | OpCode::AmoMinW
                | OpCode::AmoMaxW
                | OpCode::AmoMinuW
                | OpCode::AmoMaxuW
        )
    }

    /// Whether this operation writes a register through `rd`.
    pub fn writes_rd(self) -> bool {
        !matches!(
            self,
            OpCode::Beq
                | OpCode::Bne
                | OpCode::Blt
                | OpCode::Bge
                | OpCode::Bltu
                | OpCode::Bgeu
                | OpCode::Sb
                | OpCode::Sh
                | OpCode::Sw
                | OpCode::Fence
                | OpCode::FenceI
                | OpCode::Ecall
                | OpCode::Ebreak
                | OpCode::Mret
                | OpCode::Wfi
                | OpCode::Illegal
        )
    }
}

/// Fully decoded instruction, as cached by the decode cache and consumed by
/// the execute stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedOp {
    /// The operation.
    pub op: OpCode,
    /// Destination register field (0 when unused).
    pub rd: u8,
    /// First source field. Holds `zimm` for the immediate CSR forms.
    pub rs1: u8,
    /// Second source field (0 when unused).
    pub rs2: u8,
    /// Sign-extended immediate; the CSR number for Zicsr operations.
    pub imm: u32,
    /// False when every register this instruction reads is `x0`, letting the
    /// pipeline skip the register-file read entirely.
    pub needs_operands: bool,
}

impl DecodedOp {
    /// The all-zeroes illegal placeholder.
    pub fn illegal() -> Self {
        Self {
            op: OpCode::Illegal,
            rd: 0,
            rs1: 0,
            rs2: 0,
            imm: 0,
            needs_operands: false,
        }
    }
}

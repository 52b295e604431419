//! RV32 instruction decoder.
//!
//! Decoding is total: any encoding that is not a recognized
//! RV32I/M/A/Zicsr/Zifencei instruction decodes to [`OpCode::Illegal`] and
//! the execute stage raises the trap. Register fields that an operation does
//! not use are zeroed so the decode cache compares cleanly.

use super::{DecodedOp, OpCode};

#[inline]
fn rd(raw: u32) -> u8 {
    ((raw >> 7) & 0x1F) as u8
}

#[inline]
fn rs1(raw: u32) -> u8 {
    ((raw >> 15) & 0x1F) as u8
}

#[inline]
fn rs2(raw: u32) -> u8 {
    ((raw >> 20) & 0x1F) as u8
}

#[inline]
fn funct3(raw: u32) -> u32 {
    (raw >> 12) & 0x7
}

#[inline]
fn funct7(raw: u32) -> u32 {
    raw >> 25
}

#[inline]
fn imm_i(raw: u32) -> u32 {
    ((raw as i32) >> 20) as u32
}

#[inline]
fn imm_s(raw: u32) -> u32 {
    (((raw & 0xFE00_0000) as i32 >> 20) as u32) | ((raw >> 7) & 0x1F)
}

#[inline]
fn imm_b(raw: u32) -> u32 {
    (((raw & 0x8000_0000) as i32 >> 19) as u32)
        | ((raw & 0x0000_0080) << 4)
        | ((raw >> 20) & 0x7E0)
        | ((raw >> 7) & 0x1E)
}

#[inline]
fn imm_u(raw: u32) -> u32 {
    raw & 0xFFFF_F000
}

#[inline]
fn imm_j(raw: u32) -> u32 {
    (((raw & 0x8000_0000) as i32 >> 11) as u32)
        | (raw & 0x000F_F000)
        | ((raw >> 9) & 0x800)
        | ((raw >> 20) & 0x7FE)
}

/// Decodes a raw 32-bit encoding into a [`DecodedOp`].
///
/// Compressed encodings must be expanded by [`super::rvc::expand`] first.
pub fn decode(raw: u32) -> DecodedOp {
    let (op, rd, rs1, rs2, imm) = match raw & 0x7F {
        0x37 => (OpCode::Lui, rd(raw), 0, 0, imm_u(raw)),
        0x17 => (OpCode::Auipc, rd(raw), 0, 0, imm_u(raw)),
        0x6F => (OpCode::Jal, rd(raw), 0, 0, imm_j(raw)),
        0x67 if funct3(raw) == 0 => (OpCode::Jalr, rd(raw), rs1(raw), 0, imm_i(raw)),
        0x63 => {
            let op = match funct3(raw) {
                0b000 => OpCode::Beq,
                0b001 => OpCode::Bne,
                0b100 => OpCode::Blt,
                0b101 => OpCode::Bge,
                0b110 => OpCode::Bltu,
                0b111 => OpCode::Bgeu,
                _ => return DecodedOp::illegal(),
            };
            (op, 0, rs1(raw), rs2(raw), imm_b(raw))
        }
        0x03 => {
            let op = match funct3(raw) {
                0b000 => OpCode::Lb,
                0b001 => OpCode::Lh,
                0b010 => OpCode::Lw,
                0b100 => OpCode::Lbu,
                0b101 => OpCode::Lhu,
                _ => return DecodedOp::illegal(),
            };
            (op, rd(raw), rs1(raw), 0, imm_i(raw))
        }
        0x23 => {
            let op = match funct3(raw) {
                0b000 => OpCode::Sb,
                0b001 => OpCode::Sh,
                0b010 => OpCode::Sw,
                _ => return DecodedOp::illegal(),
            };
            (op, 0, rs1(raw), rs2(raw), imm_s(raw))
        }
        0x13 => {
            let shamt = (raw >> 20) & 0x1F;
            match funct3(raw) {
                0b000 => (OpCode::Addi, rd(raw), rs1(raw), 0, imm_i(raw)),
                0b010 => (OpCode::Slti, rd(raw), rs1(raw), 0, imm_i(raw)),
                0b011 => (OpCode::Sltiu, rd(raw), rs1(raw), 0, imm_i(raw)),
                0b100 => (OpCode::Xori, rd(raw), rs1(raw), 0, imm_i(raw)),
                0b110 => (OpCode::Ori, rd(raw), rs1(raw), 0, imm_i(raw)),
                0b111 => (OpCode::Andi, rd(raw), rs1(raw), 0, imm_i(raw)),
                0b001 if funct7(raw) == 0 => (OpCode::Slli, rd(raw), rs1(raw), 0, shamt),
                0b101 if funct7(raw) == 0 => (OpCode::Srli, rd(raw), rs1(raw), 0, shamt),
                0b101 if funct7(raw) == 0x20 => (OpCode::Srai, rd(raw), rs1(raw), 0, shamt),
                _ => return DecodedOp::illegal(),
            }
        }
        0x33 => {
            let op = match (funct7(raw), funct3(raw)) {
                (0x00, 0b000) => OpCode::Add,
                (0x20, 0b000) => OpCode::Sub,
                (0x00, 0b001) => OpCode::Sll,
                (0x00, 0b010) => OpCode::Slt,
                (0x00, 0b011) => OpCode::Sltu,
                (0x00, 0b100) => OpCode::Xor,
                (0x00, 0b101) => OpCode::Srl,
                (0x20, 0b101) => OpCode::Sra,
                (0x00, 0b110) => OpCode::Or,
                (0x00, 0b111) => OpCode::And,
                (0x01, 0b000) => OpCode::Mul,
                (0x01, 0b001) => OpCode::Mulh,
                (0x01, 0b010) => OpCode::Mulhsu,
                (0x01, 0b011) => OpCode::Mulhu,
                (0x01, 0b100) => OpCode::Div,
                (0x01, 0b101) => OpCode::Divu,
                (0x01, 0b110) => OpCode::Rem,
                (0x01, 0b111) => OpCode::Remu,
                _ => return DecodedOp::illegal(),
            };
            (op, rd(raw), rs1(raw), rs2(raw), 0)
        }
        0x0F => match funct3(raw) {
            0b000 => (OpCode::Fence, 0, 0, 0, 0),
            0b001 => (OpCode::FenceI, 0, 0, 0, 0),
            _ => return DecodedOp::illegal(),
        },
        0x73 => match funct3(raw) {
            0b000 => match raw {
                0x0000_0073 => (OpCode::Ecall, 0, 0, 0, 0),
                0x0010_0073 => (OpCode::Ebreak, 0, 0, 0, 0),
                0x3020_0073 => (OpCode::Mret, 0, 0, 0, 0),
                0x1050_0073 => (OpCode::Wfi, 0, 0, 0, 0),
                _ => return DecodedOp::illegal(),
            },
            f3 => {
                let csr = raw >> 20;
                let op = match f3 {
                    0b001 => OpCode::Csrrw,
                    0b010 => OpCode::Csrrs,
                    0b011 => OpCode::Csrrc,
                    0b101 => OpCode::Csrrwi,
                    0b110 => OpCode::Csrrsi,
                    0b111 => OpCode::Csrrci,
                    _ => return DecodedOp::illegal(),
                };
                // rs1 carries zimm for the immediate forms.
                (op, rd(raw), rs1(raw), 0, csr)
            }
        },
        0x2F if funct3(raw) == 0b010 => {
            let op = match funct7(raw) >> 2 {
                0x02 if rs2(raw) == 0 => OpCode::LrW,
                0x03 => OpCode::ScW,
                0x01 => OpCode::AmoSwapW,
                0x00 => OpCode::AmoAddW,
                0x04 => OpCode::AmoXorW,
                0x0C => OpCode::AmoAndW,
                0x08 => OpCode::AmoOrW,
                0x10 => OpCode::AmoMinW,
                0x14 => OpCode::AmoMaxW,
                0x18 => OpCode::AmoMinuW,
                0x1C => OpCode::AmoMaxuW,
                _ => return DecodedOp::illegal(),
            };
            let rs2 = if op == OpCode::LrW { 0 } else { rs2(raw) };
            (op, rd(raw), rs1(raw), rs2, 0)
        }
        _ => return DecodedOp::illegal(),
    };

    let needs_operands = (op.reads_rs1() && rs1 != 0) || (op.reads_rs2() && rs2 != 0);
    DecodedOp {
        op,
        rd,
        rs1,
        rs2,
        imm,
        needs_operands,
    }
}

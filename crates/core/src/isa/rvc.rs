//! RVC (compressed) instruction expansion for RV32.
//!
//! Each 16-bit encoding expands to exactly one 32-bit RV32I/M instruction,
//! which then flows through the ordinary decoder. Expansion happens at fetch
//! so the instruction cache and the slots only ever carry 32-bit encodings
//! plus a compressed flag for PC stepping.

#[inline]
fn bit(inst: u16, n: u32) -> u32 {
    u32::from((inst >> n) & 1)
}

#[inline]
fn bits(inst: u16, hi: u32, lo: u32) -> u32 {
    (u32::from(inst) >> lo) & ((1 << (hi - lo + 1)) - 1)
}

// 32-bit encoders for the expansion targets.

fn enc_i(imm: u32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
    (imm << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
}

fn enc_r(funct7: u32, rs2: u32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
    (funct7 << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
}

fn enc_s(imm: u32, rs2: u32, rs1: u32, funct3: u32, opcode: u32) -> u32 {
    ((imm >> 5) << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | ((imm & 0x1F) << 7) | opcode
}

fn enc_b(imm: u32, rs2: u32, rs1: u32, funct3: u32) -> u32 {
    (((imm >> 12) & 1) << 31)
        | (((imm >> 5) & 0x3F) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (funct3 << 12)
        | (((imm >> 1) & 0xF) << 8)
        | (((imm >> 11) & 1) << 7)
        | 0x63
}

fn enc_j(imm: u32, rd: u32) -> u32 {
    (((imm >> 20) & 1) << 31)
        | (((imm >> 1) & 0x3FF) << 21)
        | (((imm >> 11) & 1) << 20)
        | (((imm >> 12) & 0xFF) << 12)
        | (rd << 7)
        | 0x6F
}

#[inline]
fn sext(value: u32, bits: u32) -> u32 {
    let shift = 32 - bits;
    (((value << shift) as i32) >> shift) as u32
}

/// CJ-format immediate used by `c.jal` and `c.j`.
fn imm_cj(inst: u16) -> u32 {
    let imm = (bit(inst, 12) << 11)
        | (bit(inst, 11) << 4)
        | (bits(inst, 10, 9) << 8)
        | (bit(inst, 8) << 10)
        | (bit(inst, 7) << 6)
        | (bit(inst, 6) << 7)
        | (bits(inst, 5, 3) << 1)
        | (bit(inst, 2) << 5);
    sext(imm, 12)
}

/// CB-format immediate used by `c.beqz` and `c.bnez`.
fn imm_cb(inst: u16) -> u32 {
    let imm = (bit(inst, 12) << 8)
        | (bits(inst, 11, 10) << 3)
        | (bits(inst, 6, 5) << 6)
        | (bits(inst, 4, 3) << 1)
        | (bit(inst, 2) << 5);
    sext(imm, 9)
}

/// Expands a 16-bit compressed encoding to its 32-bit equivalent.
///
/// Returns `None` for reserved or RV64-only encodings; the caller maps that
/// to an illegal instruction.
pub fn expand(inst: u16) -> Option<u32> {
    let funct3 = bits(inst, 15, 13);
    let rd_full = bits(inst, 11, 7);
    let rs2_full = bits(inst, 6, 2);
    let rd_c = bits(inst, 4, 2) + 8;
    let rs1_c = bits(inst, 9, 7) + 8;
    let imm6 = sext((bit(inst, 12) << 5) | bits(inst, 6, 2), 6);

    match (inst & 0b11, funct3) {
        // Quadrant 0
        (0b00, 0b000) => {
            // c.addi4spn
            let uimm = (bits(inst, 12, 11) << 4)
                | (bits(inst, 10, 7) << 6)
                | (bit(inst, 6) << 2)
                | (bit(inst, 5) << 3);
            if uimm == 0 {
                return None;
            }
            Some(enc_i(uimm, 2, 0b000, rd_c, 0x13))
        }
        (0b00, 0b010) => {
            // c.lw
            let uimm = (bits(inst, 12, 10) << 3) | (bit(inst, 6) << 2) | (bit(inst, 5) << 6);
            Some(enc_i(uimm, rs1_c, 0b010, rd_c, 0x03))
        }
        (0b00, 0b110) => {
            // c.sw
            let uimm = (bits(inst, 12, 10) << 3) | (bit(inst, 6) << 2) | (bit(inst, 5) << 6);
            Some(enc_s(uimm, rd_c, rs1_c, 0b010, 0x23))
        }

        // Quadrant 1
        (0b01, 0b000) => Some(enc_i(imm6 & 0xFFF, rd_full, 0b000, rd_full, 0x13)), // c.addi / c.nop
        (0b01, 0b001) => Some(enc_j(imm_cj(inst), 1)),                             // c.jal
        (0b01, 0b010) => Some(enc_i(imm6 & 0xFFF, 0, 0b000, rd_full, 0x13)),       // c.li
        (0b01, 0b011) => {
            if rd_full == 2 {
                // c.addi16sp
                let imm = sext(
                    (bit(inst, 12) << 9)
                        | (bit(inst, 6) << 4)
                        | (bit(inst, 5) << 6)
                        | (bits(inst, 4, 3) << 7)
                        | (bit(inst, 2) << 5),
                    10,
                );
                if imm == 0 {
                    return None;
                }
                Some(enc_i(imm & 0xFFF, 2, 0b000, 2, 0x13))
            } else {
                // c.lui
                if imm6 == 0 {
                    return None;
                }
                Some(((imm6 << 12) & 0xFFFF_F000) | (rd_full << 7) | 0x37)
            }
        }
        (0b01, 0b100) => {
            let shamt = (bit(inst, 12) << 5) | bits(inst, 6, 2);
            match bits(inst, 11, 10) {
                0b00 if bit(inst, 12) == 0 => Some(enc_i(shamt, rs1_c, 0b101, rs1_c, 0x13)), // c.srli
                0b01 if bit(inst, 12) == 0 => {
                    Some(enc_i(0x400 | shamt, rs1_c, 0b101, rs1_c, 0x13)) // c.srai
                }
                0b10 => Some(enc_i(imm6 & 0xFFF, rs1_c, 0b111, rs1_c, 0x13)), // c.andi
                0b11 if bit(inst, 12) == 0 => {
                    let (funct7, f3) = match bits(inst, 6, 5) {
                        0b00 => (0x20, 0b000), // c.sub
                        0b01 => (0x00, 0b100), // c.xor
                        0b10 => (0x00, 0b110), // c.or
                        _ => (0x00, 0b111),    // c.and
                    };
                    Some(enc_r(funct7, rd_c, rs1_c, f3, rs1_c, 0x33))
                }
                _ => None,
            }
        }
        (0b01, 0b101) => Some(enc_j(imm_cj(inst), 0)), // c.j
        (0b01, 0b110) => Some(enc_b(imm_cb(inst), 0, rs1_c, 0b000)), // c.beqz
        (0b01, 0b111) => Some(enc_b(imm_cb(inst), 0, rs1_c, 0b001)), // c.bnez

        // Quadrant 2
        (0b10, 0b000) => {
            // c.slli
            if bit(inst, 12) != 0 || rd_full == 0 {
                return None;
            }
            Some(enc_i(rs2_full, rd_full, 0b001, rd_full, 0x13))
        }
        (0b10, 0b010) => {
            // c.lwsp
            if rd_full == 0 {
                return None;
            }
            let uimm =
                (bit(inst, 12) << 5) | (bits(inst, 6, 4) << 2) | (bits(inst, 3, 2) << 6);
            Some(enc_i(uimm, 2, 0b010, rd_full, 0x03))
        }
        (0b10, 0b100) => match (bit(inst, 12), rd_full, rs2_full) {
            (0, 0, _) => None,
            (0, rs1, 0) => Some(enc_i(0, rs1, 0b000, 0, 0x67)), // c.jr
            (0, rd, rs2) => Some(enc_r(0, rs2, 0, 0b000, rd, 0x33)), // c.mv
            (1, 0, 0) => Some(0x0010_0073),                     // c.ebreak
            (1, rs1, 0) => Some(enc_i(0, rs1, 0b000, 1, 0x67)), // c.jalr
            (_, rd, rs2) => Some(enc_r(0, rs2, rd, 0b000, rd, 0x33)), // c.add
        },
        (0b10, 0b110) => {
            // c.swsp
            let uimm = (bits(inst, 12, 9) << 2) | (bits(inst, 8, 7) << 6);
            Some(enc_s(uimm, rs2_full, 2, 0b010, 0x23))
        }

        _ => None,
    }
}

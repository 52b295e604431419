//! Multi-cycle multiply/divide unit.
//!
//! Accepts one request at a time and acknowledges once after a configurable
//! busy time (separate for multiplies and divides). Results follow RV32M,
//! including the divide-by-zero and signed-overflow fixups.

use crate::isa::OpCode;

#[derive(Debug)]
struct Request {
    op: OpCode,
    a: u32,
    b: u32,
    remaining: u32,
}

/// The multiply/divide functional unit.
#[derive(Debug)]
pub struct MulDivUnit {
    mul_latency: u32,
    div_latency: u32,
    busy: Option<Request>,
}

impl MulDivUnit {
    /// Creates an idle unit with the given busy times in ticks.
    pub fn new(mul_latency: u32, div_latency: u32) -> Self {
        Self {
            mul_latency: mul_latency.max(1),
            div_latency: div_latency.max(1),
            busy: None,
        }
    }

    /// Starts an RV32M operation; the unit must be idle.
    pub fn start(&mut self, op: OpCode, a: u32, b: u32) {
        debug_assert!(self.busy.is_none());
        let remaining = match op {
            OpCode::Mul | OpCode::Mulh | OpCode::Mulhsu | OpCode::Mulhu => self.mul_latency,
            _ => self.div_latency,
        };
        self.busy = Some(Request {
            op,
            a,
            b,
            remaining,
        });
    }

    /// Counts down one tick; returns the result when the busy time elapses.
    pub fn tick(&mut self) -> Option<u32> {
        let req = self.busy.as_mut()?;
        req.remaining -= 1;
        if req.remaining > 0 {
            return None;
        }
        let Request { op, a, b, .. } = *req;
        self.busy = None;
        Some(compute(op, a, b))
    }
}

fn compute(op: OpCode, a: u32, b: u32) -> u32 {
    let (sa, sb) = (a as i32, b as i32);
    match op {
        OpCode::Mul => a.wrapping_mul(b),
        OpCode::Mulh => ((i64::from(sa) * i64::from(sb)) >> 32) as u32,
        OpCode::Mulhsu => ((i64::from(sa) * u64::from(b) as i64) >> 32) as u32,
        OpCode::Mulhu => ((u64::from(a) * u64::from(b)) >> 32) as u32,
        OpCode::Div => {
            if b == 0 {
                u32::MAX
            } else if sa == i32::MIN && sb == -1 {
                a
            } else {
                sa.wrapping_div(sb) as u32
            }
        }
        OpCode::Divu => {
            if b == 0 {
                u32::MAX
            } else {
                a / b
            }
        }
        OpCode::Rem => {
            if b == 0 {
                a
            } else if sa == i32::MIN && sb == -1 {
                0
            } else {
                sa.wrapping_rem(sb) as u32
            }
        }
        OpCode::Remu => {
            if b == 0 {
                a
            } else {
                a % b
            }
        }
        _ => 0,
    }
}

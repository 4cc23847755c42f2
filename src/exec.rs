use crate::instruction::Instruction;
use crate::instructions::Op;
use crate::machine::{Machine, Psw, Trap};

/// What the machine does after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Next,
    Jump(usize),
    End,
}

pub trait Executor {
    fn exec(&self, m: &mut Machine, ins: &Instruction, op: Op) -> Result<Flow, Trap>;
}

/// Integer semantics for the built-in instruction set.
pub struct IntExecutor;

impl Executor for IntExecutor {
    fn exec(&self, m: &mut Machine, ins: &Instruction, op: Op) -> Result<Flow, Trap> {
        let address = m.ip;
        match op {
            Op::Mov => {
                let x = operand(ins, 0, "mov")?;
                let y = value(m, operand(ins, 1, "mov")?)?;
                m.regs.write(x, y);
            }
            Op::Inc => {
                m.regs.modify(operand(ins, 0, "inc")?, |v| Ok(v.wrapping_add(1)))?;
            }
            Op::Dec => {
                m.regs.modify(operand(ins, 0, "dec")?, |v| Ok(v.wrapping_sub(1)))?;
            }
            Op::Add => {
                let y = value(m, operand(ins, 1, "add")?)?;
                m.regs.modify(operand(ins, 0, "add")?, |v| Ok(v.wrapping_add(y)))?;
            }
            Op::Sub => {
                let y = value(m, operand(ins, 1, "sub")?)?;
                m.regs.modify(operand(ins, 0, "sub")?, |v| Ok(v.wrapping_sub(y)))?;
            }
            Op::Mul => {
                let y = value(m, operand(ins, 1, "mul")?)?;
                m.regs.modify(operand(ins, 0, "mul")?, |v| Ok(v.wrapping_mul(y)))?;
            }
            Op::Div => {
                let y = value(m, operand(ins, 1, "div")?)?;
                // truncates toward zero; MIN / -1 wraps
                m.regs.modify(operand(ins, 0, "div")?, |v| {
                    if y == 0 {
                        Err(Trap::DivisionByZero { address })
                    } else {
                        Ok(v.wrapping_div(y))
                    }
                })?;
            }
            Op::Cmp => {
                let x = value(m, operand(ins, 0, "cmp")?)?;
                let y = value(m, operand(ins, 1, "cmp")?)?;
                m.psw = Psw::from_ordering(x.cmp(&y));
            }
            Op::Jmp => return jump(ins, "jmp"),
            Op::Je => return jump_if(ins, "je", m.psw.contains(Psw::Z)),
            Op::Jne => return jump_if(ins, "jne", !m.psw.contains(Psw::Z)),
            Op::Jg => return jump_if(ins, "jg", !m.psw.intersects(Psw::Z | Psw::N)),
            Op::Jge => return jump_if(ins, "jge", !m.psw.contains(Psw::N)),
            Op::Jl => return jump_if(ins, "jl", m.psw.contains(Psw::N)),
            Op::Jle => return jump_if(ins, "jle", m.psw.intersects(Psw::Z | Psw::N)),
            Op::Jnz => {
                let x = value(m, operand(ins, 0, "jnz")?)?;
                if x != 0 {
                    let off = value(m, operand(ins, 1, "jnz")?)?;
                    let target = address as i64 + off as i64;
                    return usize::try_from(target)
                        .map(Flow::Jump)
                        .map_err(|_| Trap::AddressOutOfRange { from: address, target });
                }
            }
            Op::Call => {
                let flow = jump(ins, "call")?;
                m.call_stack.push(address + 1);
                return Ok(flow);
            }
            Op::Ret => {
                let back = m
                    .call_stack
                    .pop()
                    .ok_or(Trap::CallStackUnderflow { address })?;
                return Ok(Flow::Jump(back));
            }
            Op::Msg => {
                let mut out = String::new();
                for part in &ins.params {
                    match part.strip_prefix('\'') {
                        // unterminated text contributes nothing
                        Some(quoted) => {
                            if let Some(text) = quoted.strip_suffix('\'') {
                                out.push_str(text);
                            }
                        }
                        None => {
                            let v = m.regs.read(part.trim_matches('\''))?;
                            out.push_str(&v.to_string());
                        }
                    }
                }
                m.output = Some(out);
            }
            Op::End => return Ok(Flow::End),
        }
        Ok(Flow::Next)
    }
}

fn operand<'a>(ins: &'a Instruction, index: usize, mnemonic: &'static str) -> Result<&'a str, Trap> {
    ins.param(index)
        .filter(|p| !p.is_empty())
        .ok_or(Trap::MissingOperand { mnemonic, index })
}

/// Integer literal, else the value of the named register.
fn value(m: &Machine, token: &str) -> Result<i32, Trap> {
    if let Ok(v) = token.parse::<i32>() {
        return Ok(v);
    }
    if is_identifier(token) {
        m.regs.read(token)
    } else {
        Err(Trap::MalformedNumericLiteral { literal: token.to_string() })
    }
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn jump(ins: &Instruction, mnemonic: &'static str) -> Result<Flow, Trap> {
    let target = operand(ins, 0, mnemonic)?;
    target
        .parse::<usize>()
        .map(Flow::Jump)
        .map_err(|_| Trap::MalformedNumericLiteral { literal: target.to_string() })
}

fn jump_if(ins: &Instruction, mnemonic: &'static str, taken: bool) -> Result<Flow, Trap> {
    if taken {
        jump(ins, mnemonic)
    } else {
        Ok(Flow::Next)
    }
}

use asm_interp::exec::{Executor, Flow, IntExecutor};
use asm_interp::instructions::{Op, Registry};
use asm_interp::{assemble, interpret_with, Error, Instruction, Machine, MachineConfig, State, Trap};
use pretty_assertions::assert_eq;

fn assert_pristine(m: &Machine) {
    assert_eq!(m.pointer(), 0);
    assert_eq!(m.compare_flag(), 0);
    assert_eq!(m.call_depth(), 0);
    assert!(m.registers().is_empty());
    assert_eq!(m.output(), None);
}

#[test]
fn fresh_machine_is_pristine() {
    assert_pristine(&Machine::default());
}

#[test]
fn output_only_when_end_is_reached() {
    let mut m = Machine::default();
    let with_end = assemble("msg 'done'\nend\n").unwrap();
    let without_end = assemble("msg 'done'\n").unwrap();
    assert_eq!(m.run(&with_end).unwrap().as_deref(), Some("done"));
    assert_eq!(m.run(&without_end).unwrap(), None);
}

#[test]
fn jump_past_the_end_is_fallthrough() {
    let mut m = Machine::default();
    let program = assemble("msg 'x'\njmp out\nend\nout:\n").unwrap();
    assert_eq!(m.run(&program).unwrap(), None);
}

#[test]
fn empty_program_falls_through() {
    let mut m = Machine::default();
    let program = assemble("; nothing here\n").unwrap();
    assert!(program.is_empty());
    assert_eq!(m.run(&program).unwrap(), None);
    let reg = Registry::shared();
    assert_eq!(m.step(&program, reg, &IntExecutor).unwrap(), State::HaltedByFallthrough);
}

#[test]
fn state_is_reset_after_every_outcome() {
    let mut m = Machine::default();

    let ok = assemble("mov a, 1\ncmp a, 2\ncall f\nend\nf:\nmsg a\nend\n").unwrap();
    assert_eq!(m.run(&ok).unwrap().as_deref(), Some("1"));
    assert_pristine(&m);

    let fall = assemble("mov a, 1\ncmp a, 0\nmsg a\n").unwrap();
    assert_eq!(m.run(&fall).unwrap(), None);
    assert_pristine(&m);

    let fail = assemble("mov a, 1\ncall f\nend\nf:\ndiv a, 0\nret\n").unwrap();
    assert!(m.run(&fail).is_err());
    assert_pristine(&m);
}

#[test]
fn registers_do_not_leak_between_runs() {
    let mut m = Machine::default();
    let set = assemble("mov a, 42\nmsg a\nend\n").unwrap();
    let read = assemble("msg a\nend\n").unwrap();
    assert_eq!(m.run(&set).unwrap().as_deref(), Some("42"));
    assert_eq!(m.run(&read).unwrap_err(), Trap::UnknownRegister { name: "a".into() });
}

#[test]
fn same_program_same_output() {
    let program = assemble(include_str!("../samples/07_fibonacci.asm")).unwrap();
    let mut m = Machine::default();
    let first = m.run(&program).unwrap();
    let second = m.run(&program).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.as_deref(), Some("Term 8 of Fibonacci series is: 21"));
}

#[test]
fn step_limit_aborts_runaway_programs() {
    let program = assemble("loop:\njmp loop\n").unwrap();
    let mut m = Machine::new(MachineConfig { max_steps: Some(1_000) });
    assert_eq!(m.run(&program).unwrap_err(), Trap::StepLimit { limit: 1_000 });
    assert_pristine(&m);
    // the budget outlives the reset
    assert_eq!(m.config().max_steps, Some(1_000));

    // a program that finishes inside the budget is unaffected
    let program = assemble("mov a, 1\nmsg a\nend\n").unwrap();
    let mut m = Machine::new(MachineConfig { max_steps: Some(3) });
    assert_eq!(m.run(&program).unwrap().as_deref(), Some("1"));
}

#[test]
fn interpret_with_applies_the_budget() {
    let cfg = MachineConfig { max_steps: Some(10) };
    let err = interpret_with("loop:\njmp loop\n", cfg).unwrap_err();
    assert_eq!(err, Error::Trap(Trap::StepLimit { limit: 10 }));
    assert_eq!(interpret_with("msg 'ok'\nend\n", cfg).unwrap().as_deref(), Some("ok"));
}

#[test]
fn config_round_trips_through_json() {
    let cfg: MachineConfig = serde_json::from_str(r#"{"max_steps": 50}"#).unwrap();
    assert_eq!(cfg, MachineConfig { max_steps: Some(50) });
    let cfg: MachineConfig = serde_json::from_str(r#"{"max_steps": null}"#).unwrap();
    assert_eq!(cfg, MachineConfig::default());
}

// Counts every instruction it is handed and defers to the integer executor.
struct Counting(std::cell::Cell<usize>);

impl Executor for Counting {
    fn exec(&self, m: &mut Machine, ins: &Instruction, op: Op) -> Result<Flow, Trap> {
        self.0.set(self.0.get() + 1);
        IntExecutor.exec(m, ins, op)
    }
}

#[test]
fn custom_executor_drives_the_run() {
    let program = assemble("mov a, 2\nl:\ndec a\njnz a, -1\nmsg 'ok'\nend\n").unwrap();
    let exec = Counting(std::cell::Cell::new(0));
    let mut m = Machine::default();
    let out = m.run_with(&program, Registry::shared(), &exec).unwrap();
    assert_eq!(out.as_deref(), Some("ok"));
    // mov, (dec, jnz) x2, msg, end
    assert_eq!(exec.0.get(), 7);
}

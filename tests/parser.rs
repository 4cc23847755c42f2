use asm_interp::parser::parse_line;
use asm_interp::{parse, Instruction};
use pretty_assertions::assert_eq;

fn ins(name: &str, params: &[&str]) -> Instruction {
    Instruction::new(name, params)
}

#[test]
fn mnemonic_then_comma_separated_params() {
    assert_eq!(parse_line("mov a, 5"), Some(ins("mov", &["a", "5"])));
    assert_eq!(parse_line("  MOV   A,   -7  "), Some(ins("mov", &["A", "-7"])));
    assert_eq!(parse_line("ret"), Some(ins("ret", &[])));
}

#[test]
fn tab_separates_the_mnemonic() {
    assert_eq!(parse_line("inc\ta"), Some(ins("inc", &["a"])));
}

#[test]
fn label_definition_is_a_single_field() {
    let l = parse_line("Fact_Loop:").unwrap();
    assert_eq!(l, ins("fact_loop:", &[]));
    assert!(l.is_label());
    assert_eq!(l.label_name(), Some("fact_loop"));

    // anything after the colon is dropped
    let l = parse_line("loop: ; body follows").unwrap();
    assert_eq!(l, ins("loop:", &[]));
}

#[test]
fn quoted_text_keeps_quotes_spaces_and_commas() {
    let m = parse_line("msg 'mod(', a, ', ', b, ') = ', d").unwrap();
    assert_eq!(m.name, "msg");
    assert_eq!(m.params, ["'mod('", "a", "', '", "b", "') = '", "d"]);
}

#[test]
fn semicolon_and_colon_inside_quotes_are_text() {
    let m = parse_line("msg 'a;b: c', x ; trailing").unwrap();
    assert_eq!(m.params, ["'a;b: c'", "x"]);
}

#[test]
fn comment_ends_the_line() {
    assert_eq!(parse_line("inc a ; bump"), Some(ins("inc", &["a"])));
    assert_eq!(parse_line("end;"), Some(ins("end", &[])));
    assert_eq!(parse_line("div a,2;halve"), Some(ins("div", &["a", "2"])));
}

#[test]
fn blank_and_comment_only_lines_yield_nothing() {
    assert_eq!(parse_line(""), None);
    assert_eq!(parse_line("    \t  "), None);
    assert_eq!(parse_line("; just a comment"), None);
    assert_eq!(parse_line("   ; indented comment"), None);
}

#[test]
fn whole_source() {
    let src = "\
; My first program
mov  a, 5
inc  a
call function
msg  '(5+1)/2 = ', a    ; output message
end

function:
    div  a, 2
    ret
";
    let got = parse(src);
    assert_eq!(
        got,
        vec![
            ins("mov", &["a", "5"]),
            ins("inc", &["a"]),
            ins("call", &["function"]),
            ins("msg", &["'(5+1)/2 = '", "a"]),
            ins("end", &[]),
            ins("function:", &[]),
            ins("div", &["a", "2"]),
            ins("ret", &[]),
        ]
    );
}

#[test]
fn crlf_line_endings() {
    let got = parse("mov a, 1\r\n\r\nend\r\n");
    assert_eq!(got, vec![ins("mov", &["a", "1"]), ins("end", &[])]);
}

#[test]
fn unknown_mnemonics_still_parse() {
    assert_eq!(parse_line("frobnicate x, y"), Some(ins("frobnicate", &["x", "y"])));
}

#[test]
fn display_joins_params() {
    assert_eq!(ins("mov", &["a", "5"]).to_string(), "mov a, 5");
    assert_eq!(ins("end", &[]).to_string(), "end");
}

// crates/parser/tests/lexer_semis.rs
use goir_parser::lexer::{Lexer, Tok};

fn injected_semis(input: &str) -> Vec<usize> {
    Lexer::new(input)
        .filter_map(|(s, t, e)| (matches!(t, Tok::Semi) && s == e).then_some(s))
        .collect()
}

fn tok_name(t: &Tok<'_>) -> String {
    match t {
        Tok::Ident(_) => "IDENT".into(),
        Tok::Int(_) => "INT".into(),
        Tok::Float(_) => "FLOAT".into(),
        Tok::Imag(_) => "IMAG".into(),
        Tok::Rune(_) => "CHAR".into(),
        Tok::Str(_) | Tok::RawStr(_) => "STRING".into(),
        Tok::Error => "ERROR".into(),
        other => other.to_string(),
    }
}

fn lex_names(input: &str) -> String {
    Lexer::new(input)
        .map(|(_, t, _)| tok_name(&t))
        .collect::<Vec<_>>()
        .join(" ")
}

struct SemiCase {
    input: &'static str,
    want: &'static str,
}

#[rustfmt::skip]
const SEMICOLON_TESTS: &[SemiCase] = &[
    SemiCase { input: "", want: "" },
    SemiCase { input: "\u{FEFF};", want: ";" },
    SemiCase { input: ";", want: ";" },

    SemiCase { input: "foo\n", want: "IDENT ;" },
    SemiCase { input: "123\n", want: "INT ;" },
    SemiCase { input: "1.2\n", want: "FLOAT ;" },
    SemiCase { input: "'x'\n", want: "CHAR ;" },
    SemiCase { input: "\"x\"\n", want: "STRING ;" },
    SemiCase { input: "`x`\n", want: "STRING ;" },

    SemiCase { input: "+\n", want: "+" },
    SemiCase { input: "*\n", want: "*" },
    SemiCase { input: "&^=\n", want: "&^=" },
    SemiCase { input: "<-\n", want: "<-" },
    SemiCase { input: "++\n", want: "++ ;" },
    SemiCase { input: "--\n", want: "-- ;" },
    SemiCase { input: ":=\n", want: ":=" },
    SemiCase { input: "...\n", want: "..." },

    SemiCase { input: "(\n", want: "(" },
    SemiCase { input: "{\n", want: "{" },
    SemiCase { input: ")\n", want: ") ;" },
    SemiCase { input: "]\n", want: "] ;" },
    SemiCase { input: "}\n", want: "} ;" },

    SemiCase { input: "break\n", want: "break ;" },
    SemiCase { input: "continue\n", want: "continue ;" },
    SemiCase { input: "fallthrough\n", want: "fallthrough ;" },
    SemiCase { input: "return\n", want: "return ;" },
    SemiCase { input: "chan\n", want: "chan" },
    SemiCase { input: "func\n", want: "func" },
    SemiCase { input: "interface\n", want: "interface" },
    SemiCase { input: "struct\n", want: "struct" },
    SemiCase { input: "switch\n", want: "switch" },

    SemiCase { input: "foo//comment\n", want: "IDENT ;" },
    SemiCase { input: "foo//comment", want: "IDENT ;" },
    SemiCase { input: "foo/*comment*/\n", want: "IDENT ;" },
    SemiCase { input: "foo/*\n*/", want: "IDENT ;" },
    SemiCase { input: "foo    /*\n*/    ", want: "IDENT ;" },

    SemiCase {
        input: "package main\n\nfunc main() {\n\tif {\n\t\treturn /* */ }\n}\n",
        want: "package IDENT ; func IDENT ( ) { if { return } ; } ;",
    },
    SemiCase { input: "package main", want: "package IDENT ;" },
];

#[test]
fn semicolons_follow_go_rules() {
    for t in SEMICOLON_TESTS {
        let got = lex_names(t.input);
        assert_eq!(got, t.want, "input=<<{}>>", t.input);

        // trailing newlines never change the token stream
        let mut trimmed = t.input;
        while let Some(rest) = trimmed.strip_suffix('\n') {
            trimmed = rest;
            assert_eq!(lex_names(trimmed), t.want, "input=<<{trimmed}>>");
        }
    }
}

#[test]
fn comment_newline_equivalence() {
    assert_eq!(injected_semis("x/*\n*/y").len(), injected_semis("x\ny").len());
}

#[test]
fn crlf_and_cr_terminate_lines() {
    assert_eq!(injected_semis("x\r\ny"), vec![1, 4]);
    assert_eq!(injected_semis("x/*\r*/y"), vec![3, 7]);
}

#[test]
fn block_comment_newline_does_not_insert_after_keyword() {
    assert_eq!(injected_semis("if/*\n*/x"), vec![8]);
}

#[test]
fn line_comment_at_eof() {
    let src = "x//c";
    assert_eq!(injected_semis(src), vec![src.len()]);
}

#[test]
fn semis_after_declarations() {
    let src = "package p\ntype T struct {\n\tA int\n}\nconst C = 1\n";
    assert_eq!(
        lex_names(src),
        "package IDENT ; type IDENT struct { IDENT IDENT ; } ; const IDENT = INT ;"
    );
}

#[test]
fn comments_are_captured_in_order() {
    let mut lx = Lexer::new("// a\nx /* b */\n");
    let toks: Vec<_> = lx.by_ref().collect();
    assert_eq!(toks.len(), 2);
    let comments = lx.take_comments();
    assert_eq!(comments.len(), 2);
    assert!(comments[0].0.start < comments[1].0.start);
}

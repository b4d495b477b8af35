use std::sync::Arc;

use indoc::indoc;
use serde_json::json;

use crate::Error;
use crate::passes::{CAPTURES, Captures};
use crate::processor::{
    BuildError, BuildErrorKind, Context, Documents, Form, MemoryResolver, Options, ProcessorError,
    Registry,
};
use crate::test_utils::{form, process, replace};

fn registry() -> Registry {
    Registry::with_builtins().unwrap()
}

fn with_passes(form: Form, passes: &[&str]) -> Form {
    passes
        .iter()
        .fold(form, |form, pass| form.use_pass(pass.parse().unwrap(), Options::new()))
}

fn context(passes: &[&str]) -> Context {
    Context::for_form(with_passes(form(), passes), &registry()).unwrap()
}

fn options(value: serde_json::Value) -> Options {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn build_error(err: Error) -> BuildError {
    match err {
        Error::Build(err) => err,
        other => panic!("expected a build error, got {other:?}"),
    }
}

#[test]
fn builtins_are_registered_under_all() {
    let keys: Vec<String> = registry()
        .keys()
        .map(|(format, name)| format!("{format}:{name}"))
        .collect();
    assert_eq!(
        keys,
        [
            "all:comment",
            "all:literal",
            "all:capture",
            "all:capture_output",
            "all:if",
            "all:import",
            "all:verify",
        ]
    );
}

#[test]
fn builtins_cannot_be_registered_twice() {
    let mut registry = registry();
    let err = crate::passes::register_builtins(&mut registry).unwrap_err();
    assert_eq!(
        err,
        ProcessorError::Duplicate {
            format: "all".into(),
            name: "comment".into(),
        }
    );
}

#[test]
fn bare_names_do_not_fall_back_to_all() {
    let form = with_passes(form(), &["comment"]);
    let err = Context::for_form(form, &registry()).unwrap_err();
    assert_eq!(err.to_string(), "no pass registered as `html:comment`");
}

#[test]
fn comment_drops_its_body() {
    let mut ctx = context(&["all:comment"]);
    let out = process(&mut ctx, "a<comment>b <x/></comment>c<ignore>d</ignore>e").unwrap();
    assert_eq!(out, "ace");
}

#[test]
fn comment_takes_no_pairs() {
    let mut ctx = context(&["all:comment"]);
    let err = build_error(process(&mut ctx, "<comment k=v>x</comment>").unwrap_err());
    assert_eq!(err.kind, BuildErrorKind::Pair);
    assert_eq!(err.message, r#"unexpected pairs found ("k")"#);
}

#[test]
fn comment_commands_are_left_for_verify() {
    let mut ctx = context(&["all:comment", "all:verify"]);
    let err = build_error(process(&mut ctx, "<comment k=v/>").unwrap_err());
    assert_eq!(err.kind, BuildErrorKind::Verification);
}

#[test]
fn literal_text_is_final() {
    let mut ctx = context(&["all:literal"]);
    ctx.push(replace("x", "y")).unwrap();

    let out = process(&mut ctx, "x<literal>x</literal><l>x</l>").unwrap();
    assert_eq!(out, "yxx");
}

#[test]
fn literal_keeps_escaped_markup() {
    let mut ctx = context(&["all:literal"]);
    let out = process(&mut ctx, r"<raw>\<b\> \\</raw>").unwrap();
    assert_eq!(out, r"<b> \");
}

#[test]
fn literal_rejects_nested_markup() {
    let mut ctx = context(&["all:literal"]);
    let err = process(&mut ctx, "<literal>a<b/></literal>").unwrap_err();
    assert!(
        matches!(&err, Error::Node(crate::NodeError::UnexpectedNode { found: "command", .. })),
        "{err:?}"
    );
}

#[test]
fn capture_and_output() {
    let mut ctx = context(&["all:comment", "all:capture", "all:capture_output"]);
    let source = "<capture name=greet>Hi<comment>no</comment> there</capture>[<capout name=greet/>]";

    let out = process(&mut ctx, source).unwrap();
    assert_eq!(out, "[Hi there]");

    let captures = ctx.fetch::<Captures>(CAPTURES).unwrap();
    assert_eq!(captures.get("greet").map(String::as_str), Some("Hi there"));
}

#[test]
fn capture_without_name_is_dropped() {
    let mut ctx = context(&["all:capture"]);
    let out = process(&mut ctx, "a<capture id=x>b</capture>c").unwrap();
    assert_eq!(out, "ac");
    assert!(ctx.fetch::<Captures>("captures").unwrap().is_empty());
}

#[test]
fn capture_output_aliases() {
    let mut ctx = context(&["all:capture", "all:capture_output"]);
    let source = "<capture name=n>v</capture><capture_output name=n/><capture-output name=n/>";
    assert_eq!(process(&mut ctx, source).unwrap(), "vv");
}

#[test]
fn capture_output_requires_a_name() {
    let mut ctx = context(&["all:capture", "all:capture_output"]);
    let err = build_error(process(&mut ctx, "<capout/>").unwrap_err());
    assert_eq!(err.kind, BuildErrorKind::Syntax);
    assert_eq!(err.message, "`capout` requires a `name` pair");
}

#[test]
fn capture_output_of_unknown_capture() {
    let mut ctx = context(&["all:capture", "all:capture_output"]);
    let err = build_error(process(&mut ctx, "<capout name=missing/>").unwrap_err());
    assert_eq!(err.kind, BuildErrorKind::Hook);
    assert_eq!(err.message, "no capture named `missing`");
}

#[test]
fn if_and_unless_follow_the_form() {
    let mut ctx = context(&["all:if"]);
    let source = indoc! {r#"
        <if format=html>A</if><if format=latex>B</if>
        <unless format=html>C</unless><unless form=print>D</unless>
        <if format=html form=site>E</if><if format=html form=print>F</if>
    "#};
    assert_eq!(process(&mut ctx, source).unwrap(), "A\nD\nE\n");
}

#[test]
fn if_uses_custom_conditions() {
    let form = form().use_pass(
        "all:if".parse().unwrap(),
        options(json!({ "conditions": { "draft": true, "format": "latex" } })),
    );
    let mut ctx = Context::for_form(form, &registry()).unwrap();

    let out = process(&mut ctx, "<if draft=true>A</if><if draft=false>B</if><if format=latex>C</if>");
    assert_eq!(out.unwrap(), "AC");
}

#[test]
fn if_rejects_unknown_conditions() {
    let mut ctx = context(&["all:if"]);
    let err = build_error(process(&mut ctx, "<if colour=red>x</if>").unwrap_err());
    assert_eq!(err.kind, BuildErrorKind::Hook);
    assert_eq!(err.message, "unknown condition `colour`");
}

#[test]
fn if_stops_at_the_first_failed_condition() {
    let mut ctx = context(&["all:if"]);
    let out = process(&mut ctx, "<if format=latex colour=red>x</if>").unwrap();
    assert_eq!(out, "");
}

#[test]
fn if_rejects_invalid_options() {
    let scalar = form().use_pass("all:if".parse().unwrap(), options(json!({ "conditions": 3 })));
    let err = Context::for_form(scalar, &registry()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid option `conditions` for pass `if`: expected a map of condition values"
    );

    let embedded = form().use_pass("all:if".parse().unwrap(), options(json!({ "embed": true })));
    assert!(matches!(
        Context::for_form(embedded, &registry()),
        Err(Error::Processor(ProcessorError::InvalidOption { .. }))
    ));
}

fn documents(files: &[(&str, &str)]) -> Arc<Documents> {
    let resolver = files
        .iter()
        .fold(MemoryResolver::new(), |resolver, (name, source)| {
            resolver.with_file(*name, *source)
        });
    Arc::new(Documents::new(resolver))
}

fn build(form: &Form, documents: &Arc<Documents>) -> crate::Result<String> {
    let result = form.build(&registry(), documents)?;
    Ok(result.unwrap().as_root().unwrap().flatten()?)
}

#[test]
fn import_inlines_processed_documents() {
    let documents = documents(&[
        ("index.br", r#"A<import file="part.br"/>C<import file="part.br"/>"#),
        ("part.br", "B<comment>hidden</comment>"),
    ]);
    let form = with_passes(form(), &["all:comment", "all:import"]);

    assert_eq!(build(&form, &documents).unwrap(), "ABCB");
    assert!(documents.is_cached("part.br"));
}

#[test]
fn import_cycles_are_rejected() {
    let documents = documents(&[
        ("index.br", r#"<import file="a.br"/>"#),
        ("a.br", r#"<import file="b.br"/>"#),
        ("b.br", r#"<import file="a.br"/>"#),
    ]);
    let form = with_passes(form(), &["all:import"]);

    let err = build_error(build(&form, &documents).unwrap_err());
    assert_eq!(err.kind, BuildErrorKind::Hook);
    assert_eq!(err.message, "import cycle through `a.br`");
    assert_eq!(err.location.file(), "b.br");
}

#[test]
fn import_of_missing_document() {
    let documents = documents(&[("index.br", r#"<import file="gone.br"/>"#)]);
    let form = with_passes(form(), &["all:import"]);

    let err = build_error(build(&form, &documents).unwrap_err());
    assert_eq!(err.kind, BuildErrorKind::Hook);
    assert_eq!(
        err.message,
        "cannot read document `gone.br`: no document named `gone.br`"
    );
    assert_eq!(err.location.file(), "index.br");
}

#[test]
fn import_needs_documents() {
    let mut ctx = context(&["all:import"]);
    let err = build_error(process(&mut ctx, r#"<import file="x.br"/>"#).unwrap_err());
    assert_eq!(err.message, "cannot import `x.br` without a document source");

    let err = build_error(process(&mut ctx, "<import/>").unwrap_err());
    assert_eq!(err.kind, BuildErrorKind::Syntax);
}

#[test]
fn verify_rejects_leftover_markup() {
    let mut ctx = context(&["all:comment", "all:verify"]);
    assert_eq!(process(&mut ctx, "a<comment>b</comment>").unwrap(), "a");

    let err = build_error(process(&mut ctx, "a<x/>").unwrap_err());
    assert_eq!(err.kind, BuildErrorKind::Verification);
    insta::assert_snapshot!(err.message, @"unexpected command or block element `x`; try using the `x` or `all:x` pass");
}

#[test]
fn verify_ignores_frozen_output() {
    let mut ctx = context(&["all:literal", "all:verify"]);
    assert_eq!(process(&mut ctx, "<literal>ok</literal>").unwrap(), "ok");
}

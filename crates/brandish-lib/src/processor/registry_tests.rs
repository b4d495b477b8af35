use std::io;
use std::rc::Rc;
use std::sync::Arc;

use indoc::indoc;

use crate::Error;
use crate::processor::{
    Context, DEFAULT_ENTRY, Documents, Form, MemoryResolver, Options, Pass, PassRef,
    ProcessorError, Registry,
};
use crate::scanner::ScannerOptions;
use crate::test_utils::{Replace, form, process, replace};

fn replace_factory(_options: &Options) -> crate::Result<Option<Rc<dyn Pass>>> {
    Ok(Some(replace("x", "y")))
}

fn replace_y(_options: &Options) -> crate::Result<Option<Rc<dyn Pass>>> {
    Ok(Some(Rc::new(Replace { from: "y", to: "z" })))
}

fn opt_out(_options: &Options) -> crate::Result<Option<Rc<dyn Pass>>> {
    Ok(None)
}

#[test]
fn duplicate_registration() {
    let mut registry = Registry::new();
    registry.register("html", "replace", replace_factory).unwrap();
    registry.register("latex", "replace", replace_factory).unwrap();

    let err = registry.register("html", "replace", opt_out).unwrap_err();
    insta::assert_snapshot!(err, @"pass `html:replace` is already registered");
    assert_eq!(registry.len(), 2);
    assert!(registry.contains("latex", "replace"));
    assert!(!registry.contains("all", "replace"));
}

#[test]
fn pass_references() {
    let parsed: Vec<String> = ["replace", "all:replace"]
        .iter()
        .map(|s| format!("{:?}", s.parse::<PassRef>().unwrap()))
        .collect();
    assert_eq!(parsed, ["replace", "all:replace"]);

    for invalid in ["", ":x", "x:", "a:b:c"] {
        assert_eq!(
            invalid.parse::<PassRef>().unwrap_err(),
            ProcessorError::InvalidReference(invalid.to_owned()),
        );
    }
    assert_eq!(format!("{:?}", PassRef::direct(opt_out)), "<direct>");
}

#[test]
fn resolution() {
    let mut registry = Registry::new();
    registry.register("all", "replace", replace_factory).unwrap();

    assert!(registry.resolve(&PassRef::qualified("all", "replace"), "html").is_ok());
    assert!(registry.resolve(&PassRef::named("replace"), "all").is_ok());
    assert!(registry.resolve(&PassRef::direct(opt_out), "html").is_ok());
    assert_eq!(
        registry.resolve(&PassRef::named("replace"), "html").err(),
        Some(ProcessorError::Unknown {
            format: "html".into(),
            name: "replace".into(),
        })
    );
}

#[test]
fn form_passes_are_registered_in_order() {
    let mut registry = Registry::new();
    registry.register("html", "replace", replace_factory).unwrap();
    registry.register("html", "off", opt_out).unwrap();

    let form = form()
        .use_pass(PassRef::named("off"), Options::new())
        .use_pass(PassRef::named("replace"), Options::new())
        .use_pass(PassRef::direct(replace_y), Options::new());
    let mut ctx = Context::for_form(form, &registry).unwrap();

    assert_eq!(ctx.passes().len(), 2);
    assert_eq!(process(&mut ctx, "x").unwrap(), "z");
}

#[test]
fn form_from_json() {
    let form: Form = serde_json::from_str(indoc! {r#"
        {
            "name": "site",
            "format": "html",
            "passes": [
                { "pass": "all:comment" },
                { "pass": "if", "options": { "conditions": { "draft": true } } }
            ]
        }
    "#})
    .unwrap();

    assert_eq!(form.entry, DEFAULT_ENTRY);
    let passes: Vec<String> = form.passes.iter().map(|spec| format!("{:?}", spec.pass)).collect();
    assert_eq!(passes, ["all:comment", "if"]);
    assert!(form.passes[0].options.is_empty());
    assert_eq!(form.passes[1].options["conditions"]["draft"], true);

    let err = serde_json::from_str::<Form>(r#"{ "name": "a", "format": "b", "passes": [{ "pass": "a:" }] }"#)
        .unwrap_err();
    assert!(err.to_string().contains("invalid pass reference `a:`"), "{err}");
}

#[test]
fn form_build_loads_the_entry() {
    let mut registry = Registry::new();
    registry.register("html", "replace", replace_factory).unwrap();

    let documents = Arc::new(Documents::new(
        MemoryResolver::new().with_file("main.br", "x"),
    ));
    let form = form()
        .with_entry("main.br")
        .use_pass(PassRef::named("replace"), Options::new());

    let result = form.build(&registry, &documents).unwrap().unwrap();
    assert_eq!(result.as_root().unwrap().flatten().unwrap(), "y");
    assert_eq!(result.location().file(), "main.br");

    let err = form.with_entry("gone.br").build(&registry, &documents).unwrap_err();
    assert!(matches!(&err, Error::Resolve { name, .. } if name == "gone.br"), "{err:?}");
}

#[test]
fn documents_are_parsed_once() {
    let reads = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&reads);
    let documents = Documents::new(move |name: &str| {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match name {
            "a.br" => Ok("<{b/}".to_owned()),
            _ => Err(io::Error::new(io::ErrorKind::NotFound, "missing")),
        }
    })
    .with_options(ScannerOptions::default().with_tags('{', '}'));

    assert!(!documents.is_cached("a.br"));
    let first = documents.load("a.br").unwrap();
    let second = documents.load("a.br").unwrap();
    assert_eq!(first, second);
    assert_eq!(reads.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert!(documents.is_cached("a.br"));

    insta::assert_snapshot!(first.dump(), @r#"
    Root
      Text "<"
      Command "b"
    "#);
}

#[test]
fn document_errors() {
    let documents = Documents::new(MemoryResolver::new().with_file("bad.br", "<a>"));

    let err = documents.load("missing.br").unwrap_err();
    insta::assert_snapshot!(err, @"cannot read document `missing.br`: no document named `missing.br`");

    let err = documents.load("bad.br").unwrap_err();
    assert!(matches!(err, Error::Parse(_)), "{err:?}");
    assert!(!documents.is_cached("bad.br"));
}

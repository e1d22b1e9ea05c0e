//! End-to-end scans over assembled class files.

#[path = "../src/test/classfile.rs"]
mod classfile;

use std::borrow::Cow;

use classfile::{
    Ann, ClassFileBuilder, Constant, FieldBuilder, MethodBuilder, ACC_FINAL, ACC_MODULE,
    ACC_PRIVATE, ACC_PUBLIC, ACC_STATIC,
};
use jvmscope::{
    metadata::constpool::ConstantValue, ByteSource, CancellationToken, ClassBytes,
    ClassPathEntry, DiagnosticCategory, DiagnosticSeverity, Recyclable, Recycler, Result,
    ScanConfig, Scanner,
};

fn source(name: &str, bytes: Vec<u8>) -> (String, Vec<u8>) {
    (format!("{name}.class"), bytes)
}

fn class(internal_name: &str) -> (String, Vec<u8>) {
    source(internal_name, ClassFileBuilder::new(internal_name).build())
}

#[test]
fn partial_failure_keeps_valid_classes() {
    let mut sources: Vec<_> = (0..10).map(|i| class(&format!("app/C{i}"))).collect();
    let mut truncated = ClassFileBuilder::new("app/Broken").build();
    truncated.truncate(truncated.len() / 2);
    sources.push(source("app/Broken", truncated));

    let result = Scanner::new(ScanConfig::default()).scan(sources).unwrap();

    assert_eq!(result.graph().len(), 10);
    for i in 0..10 {
        assert!(result.graph().contains(&format!("app.C{i}")));
    }
    assert!(!result.graph().contains("app.Broken"));

    let format_errors = result.diagnostics().by_category(DiagnosticCategory::Format);
    assert_eq!(format_errors.len(), 1);
    assert_eq!(format_errors[0].severity, DiagnosticSeverity::Error);
    assert_eq!(format_errors[0].source.as_deref(), Some("app/Broken.class"));
    assert!(!result.is_cancelled());
}

#[test]
fn empty_scan_is_valid() {
    let result = Scanner::new(ScanConfig::default())
        .scan(Vec::<(String, Vec<u8>)>::new())
        .unwrap();

    assert!(result.graph().is_empty());
    assert!(!result.diagnostics().has_any());
}

#[test]
fn descriptors_carry_full_detail() {
    let bytes = ClassFileBuilder::new("app/Config")
        .signature("Ljava/lang/Object;")
        .annotation(Ann::new("Lapp/Settings;"))
        .field(
            FieldBuilder::new("LIMIT", "I")
                .access(ACC_PUBLIC | ACC_STATIC | ACC_FINAL)
                .constant(Constant::Int(64)),
        )
        .field(
            FieldBuilder::new("lookup", "Ljava/util/Map;")
                .access(ACC_PRIVATE)
                .signature(
                    "Ljava/util/Map<Ljava/lang/Integer;Ljava/util/Map<Ljava/lang/String;Ljava/lang/Boolean;>;>;",
                ),
        )
        .method(
            MethodBuilder::new("load", "(Ljava/lang/String;)V")
                .access(ACC_PUBLIC)
                .exception("java/io/IOException"),
        )
        .source_file("Config.java")
        .build();

    let result = Scanner::new(ScanConfig::sequential())
        .scan(vec![source("app/Config", bytes)])
        .unwrap();
    let config = result.graph().require("app.Config").unwrap();

    assert_eq!(config.source, "app/Config.class");
    assert_eq!(config.source_index, 0);
    assert_eq!(config.source_file.as_deref(), Some("Config.java"));
    assert!(config.annotation("app.Settings").is_some());

    let limit = config.field("LIMIT").unwrap();
    assert_eq!(limit.constant_value, Some(ConstantValue::Int(64)));

    let lookup = config.field("lookup").unwrap();
    assert_eq!(
        lookup.type_signature.to_string(),
        "java.util.Map<java.lang.Integer, java.util.Map<java.lang.String, java.lang.Boolean>>"
    );

    let load = config.methods_named("load").next().unwrap();
    assert_eq!(load.exceptions, vec!["java.io.IOException".to_string()]);
    assert_eq!(load.signature.throws.len(), 1);
}

#[test]
fn collisions_keep_first_registration() {
    let first = ClassFileBuilder::new("app/Dup").build();
    let second = ClassFileBuilder::new("app/Dup")
        .field(FieldBuilder::new("extra", "I"))
        .build();

    let result = Scanner::new(ScanConfig::sequential())
        .scan(vec![
            ("lib/a.jar!/app/Dup.class".to_string(), first),
            ("lib/b.jar!/app/Dup.class".to_string(), second),
        ])
        .unwrap();

    assert_eq!(result.graph().len(), 1);
    let dup = result.graph().require("app.Dup").unwrap();
    assert_eq!(dup.source, "lib/a.jar!/app/Dup.class");
    assert!(dup.fields.is_empty());

    let collisions = result.diagnostics().by_category(DiagnosticCategory::Collision);
    assert_eq!(collisions.len(), 1);
    assert_eq!(collisions[0].severity, DiagnosticSeverity::Warning);
    assert_eq!(collisions[0].source.as_deref(), Some("lib/b.jar!/app/Dup.class"));
    assert_eq!(collisions[0].class_name.as_deref(), Some("app.Dup"));
}

#[test]
fn module_descriptors_are_skipped() {
    let module_info = ClassFileBuilder::new("module-info")
        .access(ACC_MODULE)
        .no_superclass()
        .build();

    let result = Scanner::new(ScanConfig::default())
        .scan(vec![source("module-info", module_info), class("app/Main")])
        .unwrap();

    assert_eq!(result.graph().len(), 1);
    let unsupported = result.diagnostics().by_category(DiagnosticCategory::Unsupported);
    assert_eq!(unsupported.len(), 1);
    assert_eq!(unsupported[0].severity, DiagnosticSeverity::Info);
    assert!(!result.diagnostics().has_errors());
}

#[test]
fn unreadable_sources_become_io_diagnostics() {
    let missing = std::env::temp_dir().join("jvmscope-no-such-dir/Missing.class");
    let sources: Vec<Box<dyn ByteSource>> = vec![
        Box::new(ClassPathEntry::new(&missing)),
        Box::new(ClassBytes::new("app/Main.class", ClassFileBuilder::new("app/Main").build())),
    ];

    let result = Scanner::new(ScanConfig::default()).scan(sources).unwrap();

    assert_eq!(result.graph().len(), 1);
    let io = result.diagnostics().by_category(DiagnosticCategory::Io);
    assert_eq!(io.len(), 1);
    assert_eq!(io[0].severity, DiagnosticSeverity::Error);
}

struct FailingSource;

impl ByteSource for FailingSource {
    fn identifier(&self) -> &str {
        "failing"
    }

    fn read_bytes(&self) -> Result<Cow<'_, [u8]>> {
        Err(jvmscope::Error::Io(std::io::Error::other("disk on fire")))
    }
}

#[test]
fn custom_sources_report_their_identifier() {
    let result = Scanner::new(ScanConfig::default())
        .scan(vec![FailingSource])
        .unwrap();

    let by_source = result.diagnostics().by_source("failing");
    assert_eq!(by_source.len(), 1);
    assert!(by_source[0].message.contains("disk on fire"));
}

#[test]
fn unresolved_references_are_reported_once_per_edge() {
    let sub = ClassFileBuilder::new("app/Sub")
        .extends("lib/Missing")
        .build();

    let result = Scanner::new(ScanConfig::default())
        .scan(vec![source("app/Sub", sub.clone())])
        .unwrap();
    let references = result.diagnostics().by_category(DiagnosticCategory::Reference);
    assert_eq!(references.len(), 1);
    assert!(references[0].message.contains("lib.Missing"));

    let quiet = ScanConfig {
        report_unresolved_references: false,
        ..ScanConfig::default()
    };
    let result = Scanner::new(quiet).scan(vec![source("app/Sub", sub)]).unwrap();
    assert!(result.diagnostics().by_category(DiagnosticCategory::Reference).is_empty());
}

#[test]
fn invisible_annotations_follow_config() {
    let bytes = ClassFileBuilder::new("app/Tagged")
        .invisible_annotation(Ann::new("Lapp/BuildOnly;"))
        .build();

    let result = Scanner::new(ScanConfig::default())
        .scan(vec![source("app/Tagged", bytes.clone())])
        .unwrap();
    assert!(result.graph().require("app.Tagged").unwrap().annotation("app.BuildOnly").is_some());

    let result = Scanner::new(ScanConfig::strict())
        .scan(vec![source("app/Tagged", bytes)])
        .unwrap();
    assert!(result.graph().require("app.Tagged").unwrap().annotations.is_empty());
}

#[test]
fn scans_are_idempotent() {
    let sources: Vec<_> = (0..50)
        .map(|i| {
            let bytes = ClassFileBuilder::new(&format!("app/C{i}"))
                .extends(if i == 0 { "java/lang/Object" } else { "app/C0" })
                .build();
            source(&format!("app/C{i}"), bytes)
        })
        .collect();

    let scanner = Scanner::new(ScanConfig::default());
    let first = scanner.scan(sources.clone()).unwrap();
    let second = scanner.scan(sources).unwrap();

    let names = |graph: &jvmscope::ClassGraph| {
        graph.iter().map(|c| c.name.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(first.graph()), names(second.graph()));
    assert_eq!(
        first.graph().descendants_of("app.C0"),
        second.graph().descendants_of("app.C0")
    );
    assert_eq!(first.graph().descendants_of("app.C0").len(), 49);
}

#[test]
fn cancelled_scan_returns_partial_result() {
    let token = CancellationToken::new();
    token.cancel_with("shutting down");

    let scanner = Scanner::new(ScanConfig::default()).with_cancellation(token.clone());
    let sources: Vec<_> = (0..20).map(|i| class(&format!("app/C{i}"))).collect();
    let result = scanner.scan(sources).unwrap();

    assert!(result.is_cancelled());
    assert!(result.graph().is_empty());
    assert_eq!(token.reason().as_deref(), Some("shutting down"));
}

#[test]
fn diagnostics_outlive_the_result() {
    let result = Scanner::new(ScanConfig::default())
        .scan(vec![("Broken.class".to_string(), vec![0xCA, 0xFE])])
        .unwrap();

    let diagnostics = result.shared_diagnostics();
    let graph = result.into_graph();

    assert!(graph.is_empty());
    assert_eq!(diagnostics.error_count(), 1);
}

#[derive(Default)]
struct Scratch {
    buffer: Vec<u8>,
}

impl Recyclable for Scratch {
    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn close(&mut self) {
        self.buffer = Vec::new();
    }
}

#[test]
fn recycler_rejects_misuse() {
    let pool = Recycler::new(|| Ok(Scratch::default()));
    let other = Recycler::new(|| Ok(Scratch::default()));

    let handle = pool.acquire().unwrap();
    handle.lock().buffer.push(1);
    let copy = handle.clone();

    pool.release(handle).unwrap();
    assert!(matches!(
        pool.release(copy),
        Err(jvmscope::Error::ConcurrencyInvariant(_))
    ));

    let foreign = other.acquire().unwrap();
    assert!(matches!(
        pool.release(foreign),
        Err(jvmscope::Error::ConcurrencyInvariant(_))
    ));

    let reused = pool.acquire().unwrap();
    assert!(reused.lock().buffer.is_empty());
    assert_eq!(pool.force_close(), 1);
    assert!(pool.acquire().is_err());
}

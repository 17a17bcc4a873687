use std::sync::Arc;

use gpad::codec::{self, CodecRegistry};
use gpad::{
    attrs, parse_style_xml, DefaultStyleCache, GeneratorItem, GeneratorMacro, GpadConfig,
    GpadGenerator, GpadParser, StyleMap, StyleMapConverter,
};
use gpad_test::{init_tracing, FakeHost};

const POINT_XML: &str = r#"
<element type="point" label="A">
    <show object="true" label="false" ev="4"/>
    <objColor r="0" g="0" b="255" alpha="0.0"/>
    <layer val="0"/>
    <labelMode val="1"/>
    <caption val="Test Caption"/>
    <coordStyle val="polar"/>
    <pointSize val="5"/>
    <lineStyle thickness="5" type="0"/>
    <condition showObject="a &gt; 2"/>
    <coords x="1.0" y="2.0" z="1.0"/>
</element>"#;

fn style(entries: &[(&str, &[(&str, &str)])]) -> StyleMap {
    entries
        .iter()
        .map(|(name, pairs)| (name.to_string(), attrs::from_pairs(pairs)))
        .collect()
}

// =============================================================================
// Converter
// =============================================================================

#[test]
fn test_converter_quotes_and_omits_defaults() {
    init_tracing();
    let map = parse_style_xml(POINT_XML).unwrap();
    let body = StyleMapConverter::new().convert_body(&map).unwrap();

    assert!(body.contains(r#"caption: "Test Caption""#));
    assert!(body.contains("coordStyle: polar"));
    assert!(body.contains(r#"showIf: "a > 2""#));
    assert!(body.contains("labelMode: namevalue"));
    assert!(!body.contains("layer"));
    assert!(!body.contains("pointSize"));
    assert!(!body.contains("lineStyle"));
}

#[test]
fn test_converter_output_parses_back() {
    init_tracing();
    let map = parse_style_xml(POINT_XML).unwrap();
    let sheet = StyleMapConverter::new().convert("pt", &map).unwrap();
    let script = format!("{}\nA @pt = (1, 2)", sheet);

    let mut host = FakeHost::new();
    GpadParser::new()
        .with_cache(Arc::new(DefaultStyleCache::new()))
        .parse(&mut host, &script)
        .unwrap();

    // Every replayed element matches the extracted one once defaults are
    // filled in.
    let registry = CodecRegistry::global();
    for (element, replayed) in &host.object("A").unwrap().elements {
        let codec = registry.for_element(element).unwrap();
        assert!(
            codec::equivalent(codec, replayed, &map[element.as_str()]),
            "{} differs: {:?} vs {:?}",
            element,
            replayed,
            map[element.as_str()]
        );
    }
    assert_eq!(host.element("A", "caption").unwrap()["val"], "Test Caption");
}

#[test]
fn test_captions_with_stray_brackets_parse_back() {
    init_tracing();
    for caption in ["f(x", "x)", "a{b", "[1", "p//q", "f(x)"] {
        let map = style(&[("caption", &[("val", caption)])]);
        let sheet = StyleMapConverter::new().convert("s", &map).unwrap();
        let script = format!("{}\nA @s = (1, 2)", sheet);

        let mut host = FakeHost::new();
        GpadParser::new()
            .with_cache(Arc::new(DefaultStyleCache::new()))
            .parse(&mut host, &script)
            .unwrap_or_else(|e| panic!("{:?} did not parse back: {}", sheet, e));
        assert_eq!(host.element("A", "caption").unwrap()["val"], caption);
    }
    let map = style(&[("caption", &[("val", "f(x)")])]);
    assert_eq!(
        StyleMapConverter::new().convert_body(&map).as_deref(),
        Some("caption: f(x)")
    );
}

#[test]
fn test_bar_tags_survive_the_round_trip() {
    let xml = r#"<element type="barchart">
        <tag key="barColor" value="rgba(255,0,0,0.5)" barNumber="1"/>
        <tag key="barFillType" value="2" barNumber="1"/>
        <tag key="barColor" value="rgb(0,128,0)" barNumber="3"/>
    </element>"#;
    let map = parse_style_xml(xml).unwrap();
    let body = StyleMapConverter::new().convert_body(&map).unwrap();
    assert_eq!(body, "barTag: bar=1 #FF000080 fill=crosshatch | bar=3 #008000");
}

#[test]
fn test_strict_converter_skips_unknown_elements() {
    let map = style(&[("audio", &[("val", "x.mp3")]), ("layer", &[("val", "2")])]);
    let config = GpadConfig::from_yaml("strict_properties: true").unwrap();
    let converter = StyleMapConverter::new().with_config(&config);
    assert_eq!(converter.convert_body(&map).as_deref(), Some("layer: 2"));
}

// =============================================================================
// Generator
// =============================================================================

#[test]
fn test_generated_script_parses_and_restyles() {
    init_tracing();
    let shown = &[("object", "true"), ("label", "true")][..];
    let items = vec![
        GeneratorItem::new(["s"], "segment", "Segment(A, B)").with_style(style(&[
            ("show", shown),
            ("lineStyle", &[("thickness", "9"), ("type", "15")]),
        ])),
        GeneratorItem::new(["A"], "point", "(1, 2)")
            .with_style(style(&[("show", shown), ("pointSize", &[("val", "7")])])),
        GeneratorItem::new(["B"], "point", "(3, 4)").with_style(style(&[
            ("show", &[("object", "false"), ("label", "true")]),
            ("pointSize", &[("val", "7")]),
        ])),
    ];
    let script = GpadGenerator::new().generate(&items);
    assert_eq!(
        script,
        "@style1 = { pointSize: 7 }\n\
         A @style1 = (1, 2)\n\
         B* @style1 = (3, 4)\n\
         @sStyle = { lineStyle: dashedlong thickness=9 }\n\
         s @sStyle = Segment(A, B)\n"
    );

    let mut host = FakeHost::new();
    GpadParser::new()
        .with_cache(Arc::new(DefaultStyleCache::new()))
        .parse(&mut host, &script)
        .unwrap();
    assert_eq!(host.labels(), vec!["A", "B", "s"]);
    assert_eq!(host.element("B", "pointSize").unwrap()["val"], "7");
    assert_eq!(host.element("s", "lineStyle").unwrap()["type"], "15");
}

#[test]
fn test_generator_reads_config() {
    let config = GpadConfig::from_json(
        r#"{"merge_style_sheets": false, "label_sheet_suffix": "_s", "topological_order": false}"#,
    )
    .unwrap();
    let big = style(&[
        ("show", &[("object", "true"), ("label", "true")]),
        ("pointSize", &[("val", "7")]),
    ]);
    let items = vec![
        GeneratorItem::new(["m"], "point", "Midpoint(A, B)").with_style(big.clone()),
        GeneratorItem::new(["A"], "point", "(0, 0)").with_style(big.clone()),
        GeneratorItem::new(["B"], "point", "(1, 1)").with_style(big),
    ];
    let script = GpadGenerator::with_config(&config).generate(&items);
    assert_eq!(
        script,
        "@m_s = { pointSize: 7 }\nm @m_s = Midpoint(A, B)\n\
         @A_s = { pointSize: 7 }\nA @A_s = (0, 0)\n\
         @B_s = { pointSize: 7 }\nB @B_s = (1, 1)\n"
    );
}

#[test]
fn test_slider_numbers_keep_graphics_styles() {
    let items = vec![
        GeneratorItem::new(["a"], "numeric", "3").with_style(style(&[
            ("show", &[("object", "true"), ("label", "true")]),
            ("slider", &[("min", "0"), ("max", "10"), ("width", "200")]),
            ("layer", &[("val", "2")]),
        ])),
        GeneratorItem::new(["b"], "numeric", "4").with_style(style(&[
            ("show", &[("object", "true"), ("label", "true")]),
            ("layer", &[("val", "2")]),
        ])),
    ];
    let script = GpadGenerator::new().generate(&items);
    let mut lines = script.lines();
    let first = lines.next().unwrap();
    assert!(first.starts_with("@aStyle = { slider: "));
    assert!(first.ends_with("; layer: 2 }"));
    assert_eq!(lines.next(), Some("a @aStyle = 3"));
    assert_eq!(lines.next(), Some("b = 4"));
}

#[test]
fn test_generated_macro_is_registered() {
    init_tracing();
    let shown = &[("object", "true"), ("label", "true")][..];
    let mid = GeneratorMacro::new("Mid", ["A", "B"], ["M"]).with_items(vec![
        GeneratorItem::new(["M"], "point", "Midpoint(A, B)")
            .with_style(style(&[("show", shown), ("pointSize", &[("val", "9")])])),
        GeneratorItem::new(["A"], "point", "(0, 0)"),
        GeneratorItem::new(["B"], "point", "(2, 2)"),
    ]);
    let items = vec![GeneratorItem::new(["P"], "point", "Mid((0, 0), (4, 4))")
        .with_style(style(&[("show", shown), ("pointSize", &[("val", "9")])]))];
    let script = GpadGenerator::new().generate_document(&[mid], &items);

    let mut host = FakeHost::new();
    let mut parser = GpadParser::new().with_cache(Arc::new(DefaultStyleCache::new()));
    parser.parse(&mut host, &script).unwrap();

    let registered = &host.macros()[0];
    assert_eq!(registered.name, "Mid");
    assert_eq!(registered.inputs, vec!["A", "B"]);
    assert_eq!(registered.outputs, vec!["M"]);
    assert_eq!(registered.statements.len(), 3);
    assert_eq!(registered.sheets.len(), 1);
    // The macro's sheet stays local; the construction has its own.
    assert_eq!(host.labels(), vec!["P"]);
    assert_eq!(host.element("P", "pointSize").unwrap()["val"], "9");
    assert!(!parser.global_style_sheets().contains_key("MStyle"));
    assert!(parser.global_style_sheets().contains_key("PStyle"));
}

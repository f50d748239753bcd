use pretty_assertions::assert_eq;
use v8_profile_model::parser::{parse_line, parse_log, LogParser, LogRecord, ParseStatus};
use v8_profile_model::utils::config::{ModelConfig, UNKNOWN_SYMBOL};

fn shape(log: &str) -> Vec<(String, u64, u64)> {
    let profile = parse_log(log);
    let tree = profile.tree();
    tree.iter()
        .map(|(id, node)| {
            (
                tree.path(id).join(";"),
                node.self_ticks(),
                tree.total_ticks(id),
            )
        })
        .collect()
}

#[test]
fn test_single_symbol_single_tick() {
    for k in 1..=4u64 {
        let log = format!("code-creation,LoadIC,0xabc,10,\"f\"\ntick,0xabc,+1,{}\n", k);
        let profile = parse_log(&log);

        assert_eq!(profile.total_time(), k as f64);
        assert_eq!(profile.frame_count(), 1);
        let f = profile.find_path(&["f"]).unwrap();
        assert_eq!(profile.node(f).unwrap().self_ticks(), k);
    }
}

#[test]
fn test_default_weight_is_one() {
    let profile = parse_log("code-creation,LoadIC,0xabc,10,\"f\"\ntick,0xabc,+1\n");
    assert_eq!(profile.total_time(), 1.0);
}

#[test]
fn test_reference_fixture() {
    let profile = parse_log("code-creation,LoadIC,0x100,179,\"parentNode\"\ntick,0x100,+1,0\n");
    assert!((profile.total_time() - 1.0).abs() < 0.001);
}

#[test]
fn test_parsing_is_deterministic() {
    let log = "code-creation,LazyCompile,0x10,16,\"a\"\n\
               code-creation,LazyCompile,0x20,16,\"b\"\n\
               code-creation,LazyCompile,0x30,16,\"c\"\n\
               tick,0x10,+1,1\ntick,0x20,+1,2\ntick,0x30,+1,1\n\
               tick,0x20,-1,1\ntick,0x10,-1,3\ntick,0x30,+1,1\n";

    assert_eq!(shape(log), shape(log));
    assert_eq!(parse_log(log), parse_log(log));
}

#[test]
fn test_sliced_parse_matches_single_pass() {
    let mut log = String::from("code-creation,LazyCompile,0x10,16,\"loop\"\n");
    for i in 0..500 {
        log.push_str(if i % 2 == 0 { "tick,0x10,+1,1\n" } else { "tick,0x10,-1,1\n" });
    }

    let config = ModelConfig::new().with_lines_per_slice(7);
    let mut parser = LogParser::with_config(log.clone(), &config);
    let mut slices = 1;
    while parser.step(config.lines_per_slice) == ParseStatus::Pending {
        slices += 1;
    }

    assert_eq!(slices, 501_usize.div_ceil(7));
    assert_eq!(parser.finish(), parse_log(&log));
}

#[test]
fn test_unknown_lines_are_skipped() {
    let log = "v8-version,11,3,244,8,0,0\n\
               shared-library,\"/usr/lib/libc.so\",0x7f00,0x7fff,0\n\
               code-creation,Builtin,0x200,40,\"ArrayPush\"\n\
               profiler,\"begin\",1\n\
               tick,0x200,+1,2\n";
    let profile = parse_log(log);

    assert_eq!(profile.total_time(), 2.0);
    assert_eq!(profile.stats().skipped_lines, 3);
    assert_eq!(profile.stats().code_creations, 1);
}

#[test]
fn test_unresolved_address_uses_sentinel() {
    let profile = parse_log("tick,0xdead,+1,3\n");
    let unknown = profile.find_path(&[UNKNOWN_SYMBOL]).unwrap();

    assert_eq!(profile.self_time(unknown), 3.0);
    assert_eq!(profile.stats().unresolved_ticks, 3);
}

#[test]
fn test_same_name_different_address_merges() {
    let log = "code-creation,LazyCompile,0x10,16,\"f\"\n\
               code-creation,LazyCompile,0x90,16,\"f\"\n\
               tick,0x10,+1,1\ntick,0x90,0,1\n";
    let profile = parse_log(log);

    assert_eq!(profile.frame_count(), 1);
    assert_eq!(profile.total_time(), 2.0);
}

#[test]
fn test_parse_line_grammar() {
    assert_eq!(
        parse_line("code-creation,LoadIC,0x100,179,\"parentNode\""),
        LogRecord::CodeCreation {
            tag: "LoadIC".to_string(),
            address: 0x100,
            size: 179,
            name: "parentNode".to_string(),
        }
    );
    assert_eq!(parse_line("heap-sample-begin,\"Heap\",\"allocated\""), LogRecord::Unknown);
}

#[test]
fn test_fraction_of_total() {
    let log = "code-creation,LazyCompile,0x10,16,\"main\"\n\
               code-creation,LazyCompile,0x20,16,\"hot\"\n\
               code-creation,LazyCompile,0x30,16,\"cold\"\n\
               tick,0x10,+1,1\ntick,0x20,+1,6\ntick,0x30,0,1\n";
    let profile = parse_log(log);

    let hot = profile.find_path(&["main", "hot"]).unwrap();
    let cold = profile.find_path(&["main", "cold"]).unwrap();
    let main = profile.find_path(&["main"]).unwrap();

    assert_eq!(profile.fraction_of_total(main), 1.0);
    assert_eq!(profile.fraction_of_total(hot), 0.75);
    assert_eq!(profile.fraction_of_total(cold), 0.125);
}

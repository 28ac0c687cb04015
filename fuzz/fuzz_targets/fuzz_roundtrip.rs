#![no_main]
use elemtree::parser::parse_str;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Parse -> serialize -> parse must never panic, and serializing the
        // reparsed tree must reproduce the first output exactly.
        if let Ok((tree, root)) = parse_str(s) {
            let output = tree.to_xml(root);
            let (reparsed, reroot) = match parse_str(&output) {
                Ok(parsed) => parsed,
                Err(err) => panic!("serialized output does not parse: {err}\n{output}"),
            };
            assert_eq!(reparsed.to_xml(reroot), output);
        }
    }
});

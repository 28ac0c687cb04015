#![no_main]
use elemtree::Tree;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let mut tree = Tree::new();
    // Arbitrary JSON must be rejected or rebuilt, never panic.
    if let Ok(first) = tree.from_json(&value) {
        let json = tree.to_json(first);
        let second = match tree.from_json(&json) {
            Ok(id) => id,
            Err(err) => panic!("structural output does not rebuild: {err}\n{json}"),
        };
        assert_eq!(tree.to_json(second), json);
        assert_eq!(tree.to_xml(second), tree.to_xml(first));
    }
});

#[cfg(test)]
mod tests {
    use pantry_reconcile::matcher::{BestMatch, NameMatcher};
    use pantry_reconcile::normalizer::{normalize_against_master, normalize_for_matching};
    use pantry_reconcile::{
        batch_match, check_stock_availability, find_best_match, is_name_match, EngineConfig, IngredientMaster,
        MatchKind, Quantity, StockItem,
    };

    fn create_masters() -> Vec<IngredientMaster> {
        vec![
            IngredientMaster::new("鶏もも肉", "meat").with_pattern("鶏もも|鶏モモ|chicken thigh"),
            IngredientMaster::new("にんじん", "vegetable").with_pattern("にんじん|人参|ニンジン|carrots?"),
            IngredientMaster::new("醤油", "seasoning").with_literal("しょうゆ").infinite(),
        ]
    }

    #[test]
    fn test_new_onion_matches_onion() {
        assert!(is_name_match("new onion", "onion"));
        assert!(is_name_match("onion", "new onion"));
    }

    #[test]
    fn test_receipt_names_normalize() {
        assert_eq!(normalize_for_matching("ＰＯＲＫ　ＢＥＬＬＹ 300g"), "pork belly");
        assert_eq!(normalize_for_matching("人参（3本入り）"), "人参");
    }

    #[test]
    fn test_best_match_is_always_a_name_match() {
        let candidates = ["鶏もも肉", "鶏むね肉", "豚バラ肉", "milk", "whole milk", "にんじん"];
        let targets = ["鶏もも", "豚バラ", "Milk", "low fat milk", "牛乳", "", "にんじん 2本"];
        for target in targets {
            match find_best_match(target, &candidates) {
                BestMatch::None => {}
                best => {
                    let name = best.name().unwrap();
                    assert!(is_name_match(target, name), "{target} -> {name}");
                }
            }
        }
    }

    #[test]
    fn test_batch_accuracy() {
        let candidates = ["鶏もも肉", "にんじん", "milk"];
        let report = batch_match(&["鶏もも", "にんじん", "butter", "MILK"], &candidates);
        assert_eq!(report.exact, 2);
        assert_eq!(report.partial, 1);
        assert_eq!(report.unmatched, 1);
        assert_eq!(report.accuracy, 0.75);
    }

    #[test]
    fn test_tomato_shortage() {
        let stock = vec![StockItem::new("tomato", Quantity::new("1", "piece"))];
        assert!(!check_stock_availability("tomato", Some(&Quantity::new("2", "piece")), &stock));
    }

    #[test]
    fn test_master_lookup() {
        let masters = create_masters();

        let chicken = normalize_against_master("Chicken Thigh", &masters);
        assert_eq!(chicken.name, "鶏もも肉");
        assert_eq!(chicken.kind, MatchKind::Exact);

        let carrot = normalize_against_master("国産人参 2本", &masters);
        assert_eq!(carrot.name, "にんじん");
        assert_eq!(carrot.kind, MatchKind::Partial);

        let soy = normalize_against_master("しょうゆ", &masters);
        assert_eq!(soy.name, "醤油");
        assert!(soy.master.is_some_and(|m| m.infinity));
    }

    #[test]
    fn test_configured_partial_length() {
        let matcher = NameMatcher::with_config(EngineConfig {
            min_partial_match_len: 1,
            ..Default::default()
        });
        assert!(matcher.is_name_match("卵焼き", "卵"));
        assert!(!is_name_match("卵焼き", "卵"));
    }
}

use twinpane_core::{
    sort_key, Entry, EntryKind, EntryTree, ListConfigBuilder, SortColumn, SortConfig,
};

fn file(name: &str, size: i64) -> Entry {
    let mut entry = Entry::new(name, EntryKind::File);
    entry.size = size;
    entry
}

fn dir(name: &str) -> Entry {
    Entry::new(name, EntryKind::Directory)
}

fn sorted_names(tree: &EntryTree, config: &SortConfig) -> Vec<String> {
    tree.sorted_view(None, config)
        .iter()
        .map(|id| tree.get(*id).unwrap().name.to_string())
        .collect()
}

#[test]
fn test_directories_sort_before_files_in_both_directions() {
    let ascending = SortConfig::default();
    let descending = SortConfig {
        ascending: false,
        ..SortConfig::default()
    };

    for config in [ascending, descending] {
        let mut tree = EntryTree::new();
        tree.insert(None, Entry::parent_marker());
        tree.insert(None, file("aaa.txt", 1));
        tree.insert(None, dir("zzz"));
        tree.regenerate_all_keys(&config);

        let names = sorted_names(&tree, &config);
        assert_eq!(names[0], "..");
        assert_eq!(names[1], "zzz");
        assert_eq!(names[2], "aaa.txt");
    }
}

#[test]
fn test_number_sensitive_name_ordering() {
    let config = SortConfig {
        number_sensitive: true,
        ..SortConfig::default()
    };

    let mut tree = EntryTree::new();
    tree.insert(None, file("file10.txt", 1));
    tree.insert(None, file("file2.txt", 1));
    tree.insert(None, file("file1.txt", 1));
    tree.regenerate_all_keys(&config);

    assert_eq!(
        sorted_names(&tree, &config),
        vec!["file1.txt", "file2.txt", "file10.txt"]
    );
}

#[test]
fn test_case_insensitive_by_default() {
    let insensitive = SortConfig::default();
    let a = file("Alpha.txt", 1);
    let b = file("alpha.txt", 1);
    assert_eq!(
        sort_key(&a, &insensitive),
        sort_key(&b, &insensitive)
    );

    let sensitive = SortConfig {
        case_sensitive: true,
        ..SortConfig::default()
    };
    assert_ne!(sort_key(&a, &sensitive), sort_key(&b, &sensitive));
}

#[test]
fn test_size_column_ordering() {
    let config = SortConfig {
        column: SortColumn::Size,
        ..SortConfig::default()
    };

    let mut tree = EntryTree::new();
    tree.insert(None, file("big", 5000));
    tree.insert(None, file("small", 3));
    tree.insert(None, file("medium", 400));
    tree.regenerate_all_keys(&config);

    assert_eq!(sorted_names(&tree, &config), vec!["small", "medium", "big"]);
}

#[test]
fn test_stats_track_inserts_removes_and_selection() {
    let mut tree = EntryTree::new();
    tree.insert(None, Entry::parent_marker());
    let docs = tree.insert(None, dir("docs"));
    let a = tree.insert(None, file("a.txt", 100));
    let b = tree.insert(None, file("b.txt", 40));
    tree.insert(Some(docs), file("docs/nested.txt", 9999));

    let stats = *tree.stats();
    assert_eq!(stats.dirs_count, 1);
    assert_eq!(stats.files_count, 2);
    assert_eq!(stats.size_total, 140);

    tree.set_selected(a, true);
    tree.set_selected(b, true);
    tree.set_selected(b, false);

    let stats = *tree.stats();
    assert_eq!(stats.files_selected, 1);
    assert_eq!(stats.size_selected, 100);

    tree.remove(a);
    let stats = *tree.stats();
    assert_eq!(stats.files_count, 1);
    assert_eq!(stats.files_selected, 0);
    assert_eq!(stats.size_selected, 0);
    assert!(stats.files_selected <= stats.files_count);
}

#[test]
fn test_recount_matches_incremental_counters() {
    let mut tree = EntryTree::new();
    let ids: Vec<_> = (0..10)
        .map(|index| tree.insert(None, file(&format!("f{index}"), index as i64 * 10)))
        .collect();

    for id in ids.iter().step_by(2) {
        tree.set_selected(*id, true);
    }
    let incremental = *tree.stats();

    tree.recount_selection();
    let recounted = *tree.stats();

    assert_eq!(incremental, recounted);
}

#[test]
fn test_config_builder_defaults_and_validation() {
    let config = ListConfigBuilder::default().build().unwrap();
    assert!(!config.show_hidden);
    assert_eq!(config.batch_size, 100);

    let invalid = ListConfigBuilder::default().batch_size(0usize).build();
    assert!(invalid.is_err());
}

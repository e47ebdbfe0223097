//! FrameSelection tests.

use framepick::FrameSelection;

#[test]
fn toggle_twice_is_identity() {
    let mut selection: FrameSelection = [4, 9].into_iter().collect();
    for frame in [0, 4, 9, 100] {
        let before = selection.sorted();
        selection.toggle(frame);
        selection.toggle(frame);
        assert_eq!(selection.sorted(), before);
    }
}

#[test]
fn toggle_reports_membership() {
    let mut selection = FrameSelection::new();
    assert!(selection.toggle(7));
    assert!(selection.contains(7));
    assert!(!selection.toggle(7));
    assert!(!selection.contains(7));
}

#[test]
fn sorted_is_ascending_without_duplicates() {
    let mut selection = FrameSelection::new();
    selection.extend([30, 2, 17, 2, 0, 30, 99]);

    assert_eq!(selection.sorted(), vec![0, 2, 17, 30, 99]);
    assert_eq!(selection.len(), 5);
    assert_eq!(selection.iter().collect::<Vec<_>>(), selection.sorted());
    assert_eq!(selection.nth(0), Some(0));
    assert_eq!(selection.nth(4), Some(99));
    assert_eq!(selection.nth(5), None);
}

#[test]
fn add_remove_clear() {
    let mut selection = FrameSelection::new();
    assert!(selection.is_empty());

    assert!(selection.add(3));
    assert!(!selection.add(3));
    assert!(selection.remove(3));
    assert!(!selection.remove(3));

    selection.extend(0..10);
    selection.clear();
    assert!(selection.is_empty());
    assert!(selection.sorted().is_empty());
}

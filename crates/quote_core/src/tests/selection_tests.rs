use super::*;

#[test]
fn starts_empty() {
    let selection = Selection::new();
    assert!(selection.is_empty());
    assert!(!selection.is_partial());
    assert!(!selection.is_complete());
    assert_eq!(selection.editing_index(), None);
    assert_eq!(selection.spec(), None);
}

#[test]
fn predicates_track_required_steps() {
    let mut selection = Selection::new();
    selection.set_bracket(BracketType::Tilting);
    assert!(selection.is_partial());
    assert_eq!(
        selection.missing_fields(),
        vec![SelectionField::Size, SelectionField::Wall]
    );

    selection.set_size(SizeClass::Over75);
    selection.set_wall(WallType::Plaster);
    assert!(selection.is_complete());
    assert!(!selection.is_partial());
    assert!(selection.missing_fields().is_empty());
}

#[test]
fn addons_alone_leave_selection_empty() {
    let mut selection = Selection::new();
    selection.toggle_addon(AddonKind::Hdmi);
    assert!(selection.is_empty());
    assert!(selection.addons().contains(&AddonKind::Hdmi));
}

#[test]
fn setters_overwrite_without_ordering_checks() {
    let mut selection = Selection::new();
    selection.set_wall(WallType::Commercial);
    selection.set_wall(WallType::NotSure);
    assert_eq!(selection.wall(), Some(WallType::NotSure));
    assert_eq!(selection.size(), None);
}

#[test]
fn toggle_addon_is_an_involution() {
    let mut selection = Selection::new();
    assert!(selection.toggle_addon(AddonKind::Soundbar));
    assert!(!selection.toggle_addon(AddonKind::Soundbar));
    assert!(selection.addons().is_empty());
}

#[test]
fn reset_clears_fields_and_editing_index() {
    let item = LineItem::snapshot(
        MountSpec {
            size: SizeClass::UpTo55,
            bracket: BracketType::Own,
            wall: WallType::Plaster,
            addons: BTreeSet::from([AddonKind::CordCover]),
        },
        138,
    );
    let mut selection = Selection::new();
    selection.load_item(&item, 2);
    assert_eq!(selection.editing_index(), Some(2));
    assert!(selection.is_complete());

    selection.reset();
    assert_eq!(selection, Selection::default());
}

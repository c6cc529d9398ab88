use crate::ProfileFilter;

#[test]
fn test_filter_all_includes_everything() {
    let filter = ProfileFilter::all();

    assert!(filter.includes(Some("Clase A")));
    assert!(filter.includes(None));
}

#[test]
fn test_filter_empty_selection_includes_everything() {
    let names: Vec<String> = Vec::new();
    let filter = ProfileFilter::only(&names);

    assert!(filter.includes(Some("Clase B")));
}

#[test]
fn test_filter_only_matches_named_profiles_and_shared_sites() {
    let names = vec!["Clase A".to_string()];
    let filter = ProfileFilter::only(&names);

    assert!(filter.includes(Some("Clase A")));
    assert!(!filter.includes(Some("Clase B")));
    assert!(filter.includes(None));
}

#[test]
fn test_filter_treats_empty_owner_as_shared() {
    let names = vec!["Clase A".to_string()];
    let filter = ProfileFilter::only(&names);

    assert!(filter.includes(Some("")));
}

#[test]
fn test_site_with_empty_owner_is_shared() {
    let site = crate::Site::new("Reloj".to_string(), Some(String::new()));

    assert!(site.is_shared());
    assert!(crate::owner_name(site.profile_name).is_none());
}

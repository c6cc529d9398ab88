/// Selects which sites belong to a set of profiles.
///
/// Shared sites (no profile, or an empty one) always match. An absent or empty selection
/// matches everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileFilter<'a> {
    profile_names: Option<&'a [String]>,
}

impl<'a> ProfileFilter<'a> {
    pub fn all() -> Self {
        Self {
            profile_names: None,
        }
    }

    pub fn only(profile_names: &'a [String]) -> Self {
        Self {
            profile_names: Some(profile_names),
        }
    }

    pub fn from_option(profile_names: Option<&'a [String]>) -> Self {
        Self { profile_names }
    }

    pub fn includes(&self, profile_name: Option<&str>) -> bool {
        let profile_name = profile_name.filter(|name| !name.is_empty());
        match (self.profile_names, profile_name) {
            (None, _) => true,
            (Some([]), _) => true,
            (Some(_), None) => true,
            (Some(names), Some(name)) => names.iter().any(|n| n == name),
        }
    }
}

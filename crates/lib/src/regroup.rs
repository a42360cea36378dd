//! Bucket ordering for captured manifests.

use crate::manifest::Manifest;

/// Sort a captured manifest into render order.
///
/// Gems within each group are ordered by name. The sort is stable, so gems
/// declared more than once keep their relative order. Groups stay in the order
/// they were first seen, except that the default group always comes first.
pub fn regroup(manifest: &mut Manifest) {
  for group in &mut manifest.groups {
    group.gems.sort_by(|a, b| a.name.cmp(&b.name));
  }
  manifest.groups.sort_by_key(|group| !group.key.is_default());
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::manifest::{GemDecl, GroupKey, Value};

  fn gem(name: &str, version: &str) -> GemDecl {
    GemDecl {
      name: name.to_string(),
      args: vec![Value::Str(version.to_string())],
      options: Vec::new(),
    }
  }

  #[test]
  fn gems_are_sorted_by_name() {
    let mut manifest = Manifest::default();
    for name in ["puma", "bootsnap", "rails", "pg"] {
      manifest.push_gem(GroupKey::default_group(), GemDecl::new(name));
    }

    regroup(&mut manifest);

    let names: Vec<_> = manifest.groups[0].gems.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["bootsnap", "pg", "puma", "rails"]);
  }

  #[test]
  fn equal_names_keep_declaration_order() {
    let mut manifest = Manifest::default();
    manifest.push_gem(GroupKey::default_group(), gem("rails", "first"));
    manifest.push_gem(GroupKey::default_group(), gem("pg", "only"));
    manifest.push_gem(GroupKey::default_group(), gem("rails", "second"));

    regroup(&mut manifest);

    let gems = &manifest.groups[0].gems;
    assert_eq!(gems[0].name, "pg");
    assert_eq!(gems[1].args, vec![Value::Str("first".into())]);
    assert_eq!(gems[2].args, vec![Value::Str("second".into())]);
  }

  #[test]
  fn default_group_moves_first_others_keep_first_seen_order() {
    let mut manifest = Manifest::default();
    manifest.push_gem(GroupKey::new(["test"]), GemDecl::new("rspec"));
    manifest.push_gem(GroupKey::new(["development"]), GemDecl::new("pry"));
    manifest.push_gem(GroupKey::default_group(), GemDecl::new("rails"));
    manifest.push_gem(GroupKey::new(["assets"]), GemDecl::new("sass"));

    regroup(&mut manifest);

    let keys: Vec<String> = manifest.groups.iter().map(|g| g.key.to_string()).collect();
    assert_eq!(keys, ["default", "test", "development", "assets"]);
  }

  #[test]
  fn sorting_is_byte_wise() {
    let mut manifest = Manifest::default();
    for name in ["rails", "Rake", "rack"] {
      manifest.push_gem(GroupKey::default_group(), GemDecl::new(name));
    }

    regroup(&mut manifest);

    let names: Vec<_> = manifest.groups[0].gems.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["Rake", "rack", "rails"]);
  }
}

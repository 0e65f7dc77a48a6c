//! The policy evaluator.
//!
//! Pure policy check, in the same spirit as a domain `authorize()`:
//! - No IO
//! - No panics
//! - Strictly binary outcome

use admingate_identity::RoleLevel;

use crate::requirement::{Combinator, Requirement, ResourceRequirement, RoleRequirement};
use crate::subject::GrantSnapshot;

/// Outcome of evaluating one requirement against one subject.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Evaluate a requirement against a resolved subject snapshot.
///
/// SuperAdmin bypasses every requirement, role or resource, before the
/// requirement's own logic runs. Everything else fails closed: empty
/// requirement sets, unresolved resource types, and unrecognized
/// combinators all deny.
pub fn evaluate(requirement: &Requirement, subject: &GrantSnapshot) -> Decision {
    if subject.role_level == RoleLevel::SuperAdmin {
        return Decision::Allow;
    }

    match requirement {
        Requirement::Role(role) => evaluate_role(role, subject),
        Requirement::Resource(resource) => evaluate_resource(resource, subject),
    }
}

fn evaluate_role(requirement: &RoleRequirement, subject: &GrantSnapshot) -> Decision {
    if requirement.allowed.contains(&subject.role_level) {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

#[allow(unreachable_patterns)] // a future combinator denies until handled here
fn evaluate_resource(requirement: &ResourceRequirement, subject: &GrantSnapshot) -> Decision {
    if requirement.ids.is_empty() {
        return Decision::Deny;
    }

    let grants = subject.grants_for(requirement.resource_type);

    let satisfied = match requirement.combinator {
        Combinator::All => requirement
            .ids
            .iter()
            .all(|id| grants.is_some_and(|g| g.contains(id))),
        Combinator::Any => requirement
            .ids
            .iter()
            .any(|id| grants.is_some_and(|g| g.contains(id))),
        _ => false,
    };

    if satisfied { Decision::Allow } else { Decision::Deny }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirement::{ResourceType, RoleRequirement};

    fn member_with_menus(ids: impl IntoIterator<Item = i64>) -> GrantSnapshot {
        GrantSnapshot::new(RoleLevel::Member).with_grants(ResourceType::Menu, ids)
    }

    #[test]
    fn super_admin_bypasses_role_requirements() {
        let subject = GrantSnapshot::new(RoleLevel::SuperAdmin);
        let requirement = Requirement::Role(RoleRequirement::new([RoleLevel::Guest]));
        assert_eq!(evaluate(&requirement, &subject), Decision::Allow);
    }

    #[test]
    fn super_admin_bypasses_resource_requirements_even_with_garbage_ids() {
        let subject = GrantSnapshot::new(RoleLevel::SuperAdmin);

        let garbage = Requirement::Resource(ResourceRequirement::new(
            ResourceType::Menu,
            [-1, 0, 999_999],
            Combinator::All,
        ));
        assert_eq!(evaluate(&garbage, &subject), Decision::Allow);

        let empty = Requirement::Resource(ResourceRequirement::new(
            ResourceType::Menu,
            [],
            Combinator::Any,
        ));
        assert_eq!(evaluate(&empty, &subject), Decision::Allow);
    }

    #[test]
    fn role_requirement_is_membership() {
        let requirement = Requirement::Role(RoleRequirement::admin());

        let member = GrantSnapshot::new(RoleLevel::Member);
        assert_eq!(evaluate(&requirement, &member), Decision::Deny);

        let sub_admin = GrantSnapshot::new(RoleLevel::SubAdmin);
        assert_eq!(evaluate(&requirement, &sub_admin), Decision::Allow);
    }

    #[test]
    fn all_combinator_requires_superset() {
        let requirement = Requirement::Resource(ResourceRequirement::new(
            ResourceType::Menu,
            [5, 6],
            Combinator::All,
        ));

        assert_eq!(evaluate(&requirement, &member_with_menus([5])), Decision::Deny);
        assert_eq!(
            evaluate(&requirement, &member_with_menus([5, 6])),
            Decision::Allow
        );
        assert_eq!(
            evaluate(&requirement, &member_with_menus([5, 6, 7])),
            Decision::Allow
        );
    }

    #[test]
    fn any_combinator_requires_intersection() {
        let requirement = Requirement::Resource(ResourceRequirement::new(
            ResourceType::Menu,
            [5, 6],
            Combinator::Any,
        ));

        assert_eq!(evaluate(&requirement, &member_with_menus([])), Decision::Deny);
        assert_eq!(
            evaluate(&requirement, &member_with_menus([6])),
            Decision::Allow
        );
    }

    #[test]
    fn unresolved_resource_type_reads_as_no_access() {
        let requirement = Requirement::Resource(ResourceRequirement::new(
            ResourceType::Menu,
            [1],
            Combinator::Any,
        ));

        // Snapshot without any resolved menu grants.
        let subject = GrantSnapshot::new(RoleLevel::Member);
        assert_eq!(evaluate(&requirement, &subject), Decision::Deny);
    }

    #[test]
    fn empty_id_list_fails_closed() {
        let requirement = Requirement::Resource(ResourceRequirement::new(
            ResourceType::Menu,
            [],
            Combinator::All,
        ));
        assert_eq!(
            evaluate(&requirement, &member_with_menus([1, 2, 3])),
            Decision::Deny
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: SuperAdmin is allowed for any resource requirement,
            /// whatever the ids, combinator, or grant set.
            #[test]
            fn super_admin_always_allowed(
                ids in prop::collection::vec(any::<i64>(), 0..16),
                grants in prop::collection::hash_set(any::<i64>(), 0..16),
                all in any::<bool>(),
            ) {
                let combinator = if all { Combinator::All } else { Combinator::Any };
                let requirement = Requirement::Resource(ResourceRequirement::new(
                    ResourceType::Menu,
                    ids,
                    combinator,
                ));
                let subject = GrantSnapshot::new(RoleLevel::SuperAdmin)
                    .with_grants(ResourceType::Menu, grants);

                prop_assert_eq!(evaluate(&requirement, &subject), Decision::Allow);
            }

            /// Property: satisfying ALL of a non-empty id set implies
            /// satisfying ANY of it.
            #[test]
            fn all_implies_any(
                ids in prop::collection::vec(any::<i64>(), 1..16),
                grants in prop::collection::hash_set(any::<i64>(), 0..16),
            ) {
                let subject = GrantSnapshot::new(RoleLevel::Member)
                    .with_grants(ResourceType::Menu, grants);

                let all = Requirement::Resource(ResourceRequirement::new(
                    ResourceType::Menu,
                    ids.clone(),
                    Combinator::All,
                ));
                let any = Requirement::Resource(ResourceRequirement::new(
                    ResourceType::Menu,
                    ids,
                    Combinator::Any,
                ));

                if evaluate(&all, &subject) == Decision::Allow {
                    prop_assert_eq!(evaluate(&any, &subject), Decision::Allow);
                }
            }
        }
    }
}

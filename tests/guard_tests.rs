mod common;

use blog_backend::{
    AppError,
    guard::{Access, DenyReason, authorize, require_admin, require_identity},
};
use common::{ADMIN, ALICE, BOB, admin, alice, bob};
use uuid::Uuid;

#[test]
fn owner_is_allowed() {
    assert_eq!(authorize(Some(&alice()), ALICE), Access::Allowed);
}

#[test]
fn non_owner_user_is_denied() {
    let access = authorize(Some(&bob()), ALICE);
    assert_eq!(access, Access::Denied(DenyReason::NotOwner));
    assert!(!access.is_allowed());
}

#[test]
fn admin_is_allowed_on_any_owner() {
    assert_eq!(authorize(Some(&admin()), ALICE), Access::Allowed);
    assert_eq!(authorize(Some(&admin()), Uuid::new_v4()), Access::Allowed);
}

#[test]
fn missing_actor_is_unauthenticated_even_for_nil_owner() {
    assert_eq!(
        authorize(None, Uuid::nil()),
        Access::Denied(DenyReason::Unauthenticated)
    );
    assert_eq!(
        authorize(None, ADMIN),
        Access::Denied(DenyReason::Unauthenticated)
    );
}

#[test]
fn authorize_is_deterministic() {
    for _ in 0..3 {
        assert_eq!(authorize(Some(&bob()), BOB), Access::Allowed);
        assert_eq!(
            authorize(Some(&bob()), ALICE),
            Access::Denied(DenyReason::NotOwner)
        );
    }
}

#[test]
fn denials_map_to_error_kinds() {
    assert_eq!(
        authorize(None, ALICE).into_result(),
        Err(AppError::Unauthorized)
    );
    assert!(matches!(
        authorize(Some(&bob()), ALICE).into_result(),
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        require_admin(Some(&alice())).into_result(),
        Err(AppError::Forbidden(_))
    ));
    assert_eq!(authorize(Some(&alice()), ALICE).into_result(), Ok(()));
}

#[test]
fn require_admin_checks_role_only() {
    assert_eq!(require_admin(Some(&admin())), Access::Allowed);
    assert_eq!(
        require_admin(Some(&alice())),
        Access::Denied(DenyReason::NotAdmin)
    );
    assert_eq!(
        require_admin(None),
        Access::Denied(DenyReason::Unauthenticated)
    );
}

#[test]
fn require_identity_rejects_anonymous() {
    let actor = alice();
    assert_eq!(require_identity(Some(&actor)).map(|a| a.id), Ok(ALICE));
    assert_eq!(require_identity(None).err(), Some(AppError::Unauthorized));
}

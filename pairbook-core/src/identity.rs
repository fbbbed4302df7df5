//! Identity resolution
//!
//! Decides whether two contacts describe the same real person. This is a
//! heuristic used to reject colliding records; it is not the structural
//! equality of `Contact` and it is never used to rebuild pairings.

use crate::models::Contact;

/// Returns true if both contacts represent the same person
///
/// Names must match case-insensitively, and then either a real phone matches,
/// a real email matches, or both contacts carry only default phone and email.
/// Placeholder values are never compared against each other individually.
pub fn is_same_person(first: &Contact, second: &Contact) -> bool {
    if first.id() == second.id() {
        return true;
    }

    if first.name().normalized_for_identity() != second.name().normalized_for_identity() {
        return false;
    }

    let first_real_phone = !first.phone().is_default();
    let second_real_phone = !second.phone().is_default();
    let first_real_email = !first.email().is_default();
    let second_real_email = !second.email().is_default();

    let same_phone = first_real_phone
        && second_real_phone
        && first.phone().normalized_for_identity() == second.phone().normalized_for_identity();
    let same_email = first_real_email
        && second_real_email
        && first.email().normalized_for_identity() == second.email().normalized_for_identity();
    let both_default = !first_real_phone
        && !second_real_phone
        && !first_real_email
        && !second_real_email;

    same_phone || same_email || both_default
}

//! User profile use-case service and auth-provider message mapping.
//!
//! # Responsibility
//! - Get-or-create the profile document keyed by the auth uid.
//! - Map auth-provider error codes to user-facing messages.
//!
//! The auth provider itself (sign-in, sign-out, session observation) lives
//! outside the core; only its uid and error codes cross this boundary.

use crate::model::fields;
use crate::model::user::{NewUserProfile, User};
use crate::service::{ServiceError, ServiceResult};
use crate::store::codec::{decode, encode};
use crate::store::{Collection, DocumentPatch, DocumentStore};
use log::info;

/// Auth flow an error code came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    SignIn,
    SignUp,
}

/// Profile service facade over a document store.
pub struct ProfileService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> ProfileService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the profile for `profile.uid`, creating it first if absent.
    ///
    /// An existing profile is returned unchanged.
    pub fn create_user_profile(&self, profile: &NewUserProfile) -> ServiceResult<User> {
        if self.get_user_profile(&profile.uid)?.is_none() {
            let patch = DocumentPatch::from_fields(encode(profile)?)
                .server_timestamp(fields::CREATED_AT);
            self.store
                .set(Collection::Users, &profile.uid, &patch, false)?;
            info!("event=profile_create module=service status=ok");
        }

        self.get_user_profile(&profile.uid)?
            .ok_or(ServiceError::InconsistentState(
                "created profile not found in read-back",
            ))
    }

    pub fn get_user_profile(&self, uid: &str) -> ServiceResult<Option<User>> {
        Ok(self
            .store
            .get(Collection::Users, uid)?
            .map(decode::<User>)
            .transpose()?)
    }
}

/// Maps an auth-provider error code to a message fit for the user.
pub fn auth_error_message(flow: AuthFlow, code: &str) -> &'static str {
    match (flow, code) {
        (
            AuthFlow::SignIn,
            "auth/user-not-found" | "auth/invalid-credential" | "auth/configuration-not-found",
        ) => "You are not registered. Please sign up first.",
        (AuthFlow::SignIn, "auth/wrong-password") => "Incorrect password. Please try again.",
        (AuthFlow::SignIn, "auth/user-disabled") => "This account has been disabled.",
        (AuthFlow::SignIn, "auth/too-many-requests") => {
            "Too many failed attempts. Please try again later."
        }
        (AuthFlow::SignUp, "auth/email-already-in-use") => {
            "This email is already registered. Please sign in instead."
        }
        (AuthFlow::SignUp, "auth/weak-password") => "Password must be at least 6 characters.",
        (AuthFlow::SignUp, "auth/operation-not-allowed") => {
            "Sign up is currently disabled. Please contact support."
        }
        (_, "auth/invalid-email") => "Please enter a valid email address.",
        (_, "auth/network-request-failed") => {
            "Network error. Please check your internet connection."
        }
        (AuthFlow::SignIn, _) => "Unable to sign in. Please try again.",
        (AuthFlow::SignUp, _) => "Unable to create account. Please try again.",
    }
}

#[cfg(test)]
mod tests {
    use super::{auth_error_message, AuthFlow};

    #[test]
    fn shared_codes_map_for_both_flows() {
        for flow in [AuthFlow::SignIn, AuthFlow::SignUp] {
            assert_eq!(
                auth_error_message(flow, "auth/network-request-failed"),
                "Network error. Please check your internet connection."
            );
        }
    }

    #[test]
    fn flow_specific_codes_fall_back_outside_their_flow() {
        assert_eq!(
            auth_error_message(AuthFlow::SignIn, "auth/email-already-in-use"),
            "Unable to sign in. Please try again."
        );
        assert_eq!(
            auth_error_message(AuthFlow::SignUp, "auth/wrong-password"),
            "Unable to create account. Please try again."
        );
    }
}

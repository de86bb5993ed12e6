pub mod authenticator_data;

pub use authenticator_data::{
    build_authenticator_data, build_signature_base, parse_authenticator_data, AuthenticatorData,
};

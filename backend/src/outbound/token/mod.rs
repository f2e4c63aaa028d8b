//! Bearer token adapters.

mod jwt_codec;

pub use jwt_codec::{JwtTokenCodec, TOKEN_TTL_SECONDS};

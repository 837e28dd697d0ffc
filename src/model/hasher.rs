use crate::utils::errors::WardenError;

///
/// Password hashing with a configurable work factor.
///
/// Every hash embeds a fresh random salt, so hashing the same plain text twice
/// produces two different PHC strings which both verify.
///
#[derive(Clone, Copy, Debug)]
pub struct Hasher {
    cost: u32,
}

impl Default for Hasher {
    fn default() -> Self {
        Hasher { cost: bcrypt::DEFAULT_COST }
    }
}

impl Hasher {
    pub fn new(cost: u32) -> Self {
        Hasher { cost }
    }

    ///
    /// Hash the password and build a PHC string ($2b$12$...).
    ///
    /// ref: https://github.com/P-H-C/phc-string-format/blob/master/phc-sf-spec.md
    ///
    pub fn hash_into_phc(&self, plain_text_password: &str) -> Result<String, WardenError> {
        Ok(bcrypt::hash(plain_text_password, self.cost)?)
    }
}

///
/// Validate if the plain_text_password matches the hashed password provided.
///
/// A wrong password is a normal negative result, not an error - and so is a
/// malformed stored hash. Neither raises.
///
pub fn verify(plain_text_password: &str, phc: &str) -> bool {
    bcrypt::verify(plain_text_password, phc).unwrap_or(false)
}

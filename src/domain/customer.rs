//! Buyer data collected by the first checkout step.

use super::user::User;
use crate::error::{FieldErrors, Result};
use serde::{Deserialize, Serialize};

pub const PHONE_MASK: &str = "(##) #####-####";
pub const CPF_MASK: &str = "###.###.###-##";
pub const ZIP_CODE_MASK: &str = "#####-###";

/// Raw, possibly incomplete customer form as typed by the buyer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cpf: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// A fully validated customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerData {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cpf: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl CustomerForm {
    /// An empty form with name and email suggested from the signed-in user.
    pub fn prefilled(user: Option<&User>) -> Self {
        match user {
            Some(user) => Self {
                name: user.name.clone(),
                email: user.email.clone(),
                ..Self::default()
            },
            None => Self::default(),
        }
    }

    /// Applies the input masks: digit-only phone, CPF and zip code values are
    /// formatted, the state is upper-cased and surrounding blanks are trimmed.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.name,
            &mut self.email,
            &mut self.address,
            &mut self.city,
        ] {
            *field = field.trim().to_string();
        }
        self.phone = apply_mask(&self.phone, PHONE_MASK);
        self.cpf = apply_mask(&self.cpf, CPF_MASK);
        self.zip_code = apply_mask(&self.zip_code, ZIP_CODE_MASK);
        self.state = self.state.trim().to_uppercase();
        self
    }

    /// Checks every field and returns the validated record, or every
    /// rejected field at once.
    pub fn validate(self) -> Result<CustomerData> {
        let form = self.normalized();
        let mut errors = FieldErrors::default();

        check_length(&mut errors, "name", &form.name, 2, 100);
        if !is_email(&form.email) {
            errors.push("email", "invalid email");
        }
        if !matches_mask(&form.phone, PHONE_MASK) {
            errors.push("phone", "invalid phone format, expected (DD) DDDDD-DDDD");
        }
        if !matches_mask(&form.cpf, CPF_MASK) {
            errors.push("cpf", "invalid CPF format, expected DDD.DDD.DDD-DD");
        }
        check_length(&mut errors, "address", &form.address, 5, 200);
        check_length(&mut errors, "city", &form.city, 2, 100);
        if form.state.chars().count() != 2 || !form.state.chars().all(|c| c.is_ascii_uppercase()) {
            errors.push("state", "must be exactly two uppercase letters");
        }
        if !matches_mask(&form.zip_code, ZIP_CODE_MASK) {
            errors.push("zip_code", "invalid zip code format, expected DDDDD-DDD");
        }

        errors.into_result()?;
        Ok(CustomerData {
            name: form.name,
            email: form.email,
            phone: form.phone,
            cpf: form.cpf,
            address: form.address,
            city: form.city,
            state: form.state,
            zip_code: form.zip_code,
        })
    }
}

impl From<&CustomerData> for CustomerForm {
    fn from(data: &CustomerData) -> Self {
        Self {
            name: data.name.clone(),
            email: data.email.clone(),
            phone: data.phone.clone(),
            cpf: data.cpf.clone(),
            address: data.address.clone(),
            city: data.city.clone(),
            state: data.state.clone(),
            zip_code: data.zip_code.clone(),
        }
    }
}

fn check_length(errors: &mut FieldErrors, field: &'static str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len < min {
        errors.push(field, format!("must have at least {min} characters"));
    } else if len > max {
        errors.push(field, format!("must have at most {max} characters"));
    }
}

pub(crate) fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// `true` when `value` has the shape of `mask`, where `#` stands for one
/// ASCII digit and every other mask character must appear literally.
pub fn matches_mask(value: &str, mask: &str) -> bool {
    value.chars().count() == mask.chars().count()
        && value.chars().zip(mask.chars()).all(|(v, m)| match m {
            '#' => v.is_ascii_digit(),
            literal => v == literal,
        })
}

/// Formats a digit-only input with `mask`. Values that are not exactly as
/// many digits as the mask expects are returned trimmed but otherwise as-is.
pub fn apply_mask(value: &str, mask: &str) -> String {
    let value = value.trim();
    let slots = mask.chars().filter(|&c| c == '#').count();
    if value.len() != slots || !value.chars().all(|c| c.is_ascii_digit()) {
        return value.to_string();
    }
    let mut digits = value.chars();
    mask.chars()
        .map(|m| match m {
            '#' => digits.next().unwrap_or('#'),
            literal => literal,
        })
        .collect()
}

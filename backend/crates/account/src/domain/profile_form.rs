//! Profile Form Validation
//!
//! Rules for the profile-information form. Every field is checked and all
//! failures are collected into the `updateProfileInformation` error bag.
//!
//! | field | rules |
//! |---|---|
//! | firstname, middlename, lastname, username | required, max 255 chars |
//! | email | required, email, max 255 chars, unique |
//! | landlinetel, mobiletel | required, max 15 chars |
//! | photo | optional, image, max 1024 KiB |
//! | first_login | optional, integer, max 1 |
//!
//! Uniqueness needs the store, so validation runs in two phases: build a
//! [`ProfileValidation`] from the submission, let the caller check
//! [`ProfileValidation::email`] against the store, then
//! [`ProfileValidation::finish`].

use kernel::error::validation::{FieldError, FieldRule, ValidationErrors};

use crate::domain::value_object::{
    bounded_text::{BoundedText, BoundedTextError, ProfileText, Telephone},
    email::{EMAIL_MAX_LENGTH, Email, EmailError},
    profile_photo::{ProfilePhoto, ProfilePhotoError},
};

/// Name of the error bag the form's errors are reported under
pub const ERROR_BAG: &str = "updateProfileInformation";

const EMAIL_TAKEN: &str = "The email has already been taken.";

/// Bag reporting only that the address belongs to another user
pub fn email_taken() -> ValidationErrors {
    let mut errors = ValidationErrors::new(ERROR_BAG);
    errors.add("email", FieldError::new(FieldRule::Unique, EMAIL_TAKEN));
    errors
}

/// Raw form submission
///
/// Strings are kept exactly as submitted; blank values count as missing.
#[derive(Debug, Clone, Default)]
pub struct ProfileSubmission {
    pub firstname: Option<String>,
    pub middlename: Option<String>,
    pub lastname: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub landlinetel: Option<String>,
    pub mobiletel: Option<String>,
    pub photo: Option<Vec<u8>>,
    pub first_login: Option<String>,
}

/// Form that passed every rule
#[derive(Debug, Clone)]
pub struct ValidatedProfile {
    firstname: ProfileText,
    middlename: ProfileText,
    lastname: ProfileText,
    username: ProfileText,
    email: Email,
    landlinetel: Telephone,
    mobiletel: Telephone,
    photo: Option<ProfilePhoto>,
}

impl ValidatedProfile {
    pub fn firstname(&self) -> &ProfileText {
        &self.firstname
    }

    pub fn middlename(&self) -> &ProfileText {
        &self.middlename
    }

    pub fn lastname(&self) -> &ProfileText {
        &self.lastname
    }

    pub fn username(&self) -> &ProfileText {
        &self.username
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn landlinetel(&self) -> &Telephone {
        &self.landlinetel
    }

    pub fn mobiletel(&self) -> &Telephone {
        &self.mobiletel
    }

    pub fn photo(&self) -> Option<&ProfilePhoto> {
        self.photo.as_ref()
    }

    /// Split off the photo so it can be stored separately
    pub fn take_photo(&mut self) -> Option<ProfilePhoto> {
        self.photo.take()
    }
}

/// In-progress validation of a [`ProfileSubmission`]
#[derive(Debug)]
pub struct ProfileValidation {
    errors: ValidationErrors,
    firstname: Option<ProfileText>,
    middlename: Option<ProfileText>,
    lastname: Option<ProfileText>,
    username: Option<ProfileText>,
    email: Option<Email>,
    landlinetel: Option<Telephone>,
    mobiletel: Option<Telephone>,
    photo: Option<ProfilePhoto>,
}

impl ProfileValidation {
    pub fn new(submission: ProfileSubmission, photo_max_kilobytes: u64) -> Self {
        let mut errors = ValidationErrors::new(ERROR_BAG);

        let firstname: Option<ProfileText> =
            bounded(&mut errors, "firstname", submission.firstname.as_deref());
        let middlename: Option<ProfileText> =
            bounded(&mut errors, "middlename", submission.middlename.as_deref());
        let lastname: Option<ProfileText> =
            bounded(&mut errors, "lastname", submission.lastname.as_deref());
        let username: Option<ProfileText> =
            bounded(&mut errors, "username", submission.username.as_deref());
        let email = email(&mut errors, submission.email.as_deref());
        let photo = photo(&mut errors, submission.photo, photo_max_kilobytes);
        first_login(&mut errors, submission.first_login.as_deref());
        let landlinetel: Option<Telephone> =
            bounded(&mut errors, "landlinetel", submission.landlinetel.as_deref());
        let mobiletel: Option<Telephone> =
            bounded(&mut errors, "mobiletel", submission.mobiletel.as_deref());

        Self {
            errors,
            firstname,
            middlename,
            lastname,
            username,
            email,
            landlinetel,
            mobiletel,
            photo,
        }
    }

    /// The submitted address, if it is syntactically valid
    pub fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }

    pub fn reject_email_taken(&mut self) {
        self.errors
            .add("email", FieldError::new(FieldRule::Unique, EMAIL_TAKEN));
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn finish(self) -> Result<ValidatedProfile, ValidationErrors> {
        match self {
            Self {
                errors,
                firstname: Some(firstname),
                middlename: Some(middlename),
                lastname: Some(lastname),
                username: Some(username),
                email: Some(email),
                landlinetel: Some(landlinetel),
                mobiletel: Some(mobiletel),
                photo,
            } if errors.is_empty() => Ok(ValidatedProfile {
                firstname,
                middlename,
                lastname,
                username,
                email,
                landlinetel,
                mobiletel,
                photo,
            }),
            Self { errors, .. } => Err(errors),
        }
    }
}

fn attribute(field: &str) -> String {
    field.replace('_', " ")
}

fn required(field: &'static str) -> FieldError {
    FieldError::new(
        FieldRule::Required,
        format!("The {} field is required.", attribute(field)),
    )
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn bounded<const MAX: usize>(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&str>,
) -> Option<BoundedText<MAX>> {
    let Some(value) = present(value) else {
        errors.add(field, required(field));
        return None;
    };

    match BoundedText::<MAX>::new(value) {
        Ok(text) => Some(text),
        Err(BoundedTextError::Empty) => {
            errors.add(field, required(field));
            None
        }
        Err(BoundedTextError::TooLong { max, .. }) => {
            errors.add(
                field,
                FieldError::new(
                    FieldRule::Max,
                    format!(
                        "The {} must not be greater than {} characters.",
                        attribute(field),
                        max
                    ),
                ),
            );
            None
        }
    }
}

fn email(errors: &mut ValidationErrors, value: Option<&str>) -> Option<Email> {
    let Some(value) = present(value) else {
        errors.add("email", required("email"));
        return None;
    };

    match Email::new(value) {
        Ok(email) => Some(email),
        Err(EmailError::Empty) => {
            errors.add("email", required("email"));
            None
        }
        Err(EmailError::TooLong { .. }) => {
            errors.add(
                "email",
                FieldError::new(
                    FieldRule::Max,
                    format!(
                        "The email must not be greater than {} characters.",
                        EMAIL_MAX_LENGTH
                    ),
                ),
            );
            None
        }
        Err(EmailError::InvalidFormat) => {
            errors.add(
                "email",
                FieldError::new(FieldRule::Email, "The email must be a valid email address."),
            );
            None
        }
    }
}

fn photo(
    errors: &mut ValidationErrors,
    bytes: Option<Vec<u8>>,
    max_kilobytes: u64,
) -> Option<ProfilePhoto> {
    let bytes = bytes.filter(|b| !b.is_empty())?;

    match ProfilePhoto::new(bytes, max_kilobytes) {
        Ok(photo) => Some(photo),
        Err(ProfilePhotoError::NotAnImage) => {
            errors.add(
                "photo",
                FieldError::new(FieldRule::Image, "The photo must be an image."),
            );
            None
        }
        Err(ProfilePhotoError::TooLarge { max_kilobytes }) => {
            errors.add(
                "photo",
                FieldError::new(
                    FieldRule::Max,
                    format!(
                        "The photo must not be greater than {} kilobytes.",
                        max_kilobytes
                    ),
                ),
            );
            None
        }
    }
}

/// Accepted but never stored: the column is driven by the approval transition
fn first_login(errors: &mut ValidationErrors, value: Option<&str>) {
    let Some(value) = present(value) else {
        return;
    };

    match value.trim().parse::<i64>() {
        Ok(n) if n > 1 => errors.add(
            "first_login",
            FieldError::new(FieldRule::Max, "The first login must not be greater than 1."),
        ),
        Ok(_) => {}
        Err(_) => errors.add(
            "first_login",
            FieldError::new(FieldRule::Integer, "The first login must be an integer."),
        ),
    }
}

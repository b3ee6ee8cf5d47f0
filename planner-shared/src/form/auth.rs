use super::{FormModel, ValidationErrors, required};
use crate::models::{LoginRequest, RegisterRequest, UserRole};

fn check_email(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<String> {
    let email = required(errors, field, value)?;
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if valid {
        Some(email)
    } else {
        errors.add(field, "must be an email address");
        None
    }
}

/// Password fields are not trimmed; only emptiness is checked.
fn check_password(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<String> {
    if value.is_empty() {
        errors.add(field, "is required");
        None
    } else {
        Some(value.to_string())
    }
}

/// Sign-in form.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    email: String,
    password: String,
}

impl FormModel for LoginForm {
    type Output = LoginRequest;

    const FIELDS: &'static [&'static str] = &["email", "password"];

    fn set_field(&mut self, field: &str, value: String) -> bool {
        match field {
            "email" => self.email = value,
            "password" => self.password = value,
            _ => return false,
        }
        true
    }

    fn field(&self, field: &str) -> Option<&str> {
        match field {
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            _ => None,
        }
    }

    fn validate(&self) -> Result<LoginRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = check_email(&mut errors, "email", &self.email);
        let password = check_password(&mut errors, "password", &self.password);
        match (email, password) {
            (Some(email), Some(password)) if errors.is_empty() => {
                Ok(LoginRequest { email, password })
            }
            _ => Err(errors),
        }
    }
}

/// Account registration form. New accounts always get the `USER` role.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    name: String,
    email: String,
    password: String,
    confirm_password: String,
}

impl FormModel for RegisterForm {
    type Output = RegisterRequest;

    const FIELDS: &'static [&'static str] = &["name", "email", "password", "confirmPassword"];

    fn set_field(&mut self, field: &str, value: String) -> bool {
        match field {
            "name" => self.name = value,
            "email" => self.email = value,
            "password" => self.password = value,
            "confirmPassword" => self.confirm_password = value,
            _ => return false,
        }
        true
    }

    fn field(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            "confirmPassword" => Some(&self.confirm_password),
            _ => None,
        }
    }

    fn validate(&self) -> Result<RegisterRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required(&mut errors, "name", &self.name);
        let email = check_email(&mut errors, "email", &self.email);
        let password = check_password(&mut errors, "password", &self.password);
        if password.is_some() && self.password != self.confirm_password {
            errors.add("confirmPassword", "passwords do not match");
        }
        match (name, email, password) {
            (Some(name), Some(email), Some(password)) if errors.is_empty() => {
                Ok(RegisterRequest {
                    name,
                    email,
                    password,
                    role: UserRole::User,
                })
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormError, FormState};

    #[test]
    fn test_login_form_trims_email_not_password() {
        let mut form = FormState::<LoginForm>::new();
        form.set("email", " a@b.com ").unwrap();
        form.set("password", " x ").unwrap();
        let request = form.submit().unwrap();
        assert_eq!(request.email, "a@b.com");
        assert_eq!(request.password, " x ");
    }

    #[test]
    fn test_login_form_reports_every_field() {
        let mut form = FormState::<LoginForm>::new();
        form.set("email", "not-an-email").unwrap();
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get("email"), Some("must be an email address"));
        assert_eq!(errors.get("password"), Some("is required"));
        assert_eq!(form.errors(), &errors);
    }

    #[test]
    fn test_editing_a_field_clears_its_error() {
        let mut form = FormState::<LoginForm>::new();
        let _ = form.submit();
        form.set("password", "x").unwrap();
        assert!(form.errors().get("password").is_none());
        assert!(form.errors().get("email").is_some());
    }

    #[test]
    fn test_unknown_field() {
        let mut form = FormState::<LoginForm>::new();
        let err = form.set("username", "bob").unwrap_err();
        assert!(matches!(err, FormError::UnknownField { ref field, .. } if field == "username"));
        assert!(err.to_string().contains("email, password"));
    }

    #[test]
    fn test_register_form_requires_matching_passwords() {
        let mut form = FormState::<RegisterForm>::new()
            .with("name", "Ana")
            .unwrap()
            .with("email", "ana@example.com")
            .unwrap()
            .with("password", "secret")
            .unwrap()
            .with("confirmPassword", "secreT")
            .unwrap();
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get("confirmPassword"), Some("passwords do not match"));

        form.set("confirmPassword", "secret").unwrap();
        let request = form.submit().unwrap();
        assert_eq!(request.role, UserRole::User);
        assert_eq!(request.name, "Ana");
    }
}

//! User entity and write payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Column limits, matching the `usuarios` table definition
pub const MAX_NOMBRE_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_TELEFONO_LEN: usize = 50;

/// A registered user as stored and served back to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub descripcion: String,
    pub telefono: String,
    #[serde(with = "timestamp")]
    pub fecha_registro: DateTime<Utc>,
}

/// Raw write payload as posted by the registration form.
///
/// Every field is optional at this layer; [`NewUser::from_input`] decides
/// what is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserInput {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub descripcion: Option<String>,
}

/// Validated, trimmed fields of a user about to be inserted.
///
/// `id` and `fecha_registro` are never part of it; storage assigns them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    nombre: String,
    email: String,
    telefono: String,
    descripcion: String,
}

impl NewUser {
    /// Validate a raw payload.
    ///
    /// # Rules
    /// - `nombre` and `email` must be non-empty after trimming
    /// - `telefono` and `descripcion` default to the empty string
    /// - `nombre`, `email` and `telefono` respect the column limits
    ///
    /// # Example
    /// ```
    /// use registro_server::models::{NewUser, UserInput};
    ///
    /// let input = UserInput {
    ///     nombre: Some(" Ana ".into()),
    ///     email: Some("ana@x.com".into()),
    ///     ..Default::default()
    /// };
    /// let user = NewUser::from_input(input).unwrap();
    /// assert_eq!(user.nombre(), "Ana");
    /// assert_eq!(user.telefono(), "");
    /// ```
    pub fn from_input(input: UserInput) -> Result<Self, ValidationError> {
        let nombre = trimmed(input.nombre);
        let email = trimmed(input.email);

        if nombre.is_empty() || email.is_empty() {
            return Err(ValidationError::MissingRequired);
        }

        let user = Self {
            nombre,
            email,
            telefono: trimmed(input.telefono),
            descripcion: trimmed(input.descripcion),
        };

        check_len("nombre", &user.nombre, MAX_NOMBRE_LEN)?;
        check_len("email", &user.email, MAX_EMAIL_LEN)?;
        check_len("telefono", &user.telefono, MAX_TELEFONO_LEN)?;

        Ok(user)
    }

    pub fn nombre(&self) -> &str {
        &self.nombre
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn telefono(&self) -> &str {
        &self.telefono
    }

    pub fn descripcion(&self) -> &str {
        &self.descripcion
    }
}

/// Validated changes to an existing user.
///
/// `nombre` and `email` are always replaced. `telefono` and `descripcion`
/// are `None` when the payload left them out (or sent `null`), and the
/// stored value is kept; an empty string clears them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    nombre: String,
    email: String,
    telefono: Option<String>,
    descripcion: Option<String>,
}

impl UserUpdate {
    /// Validate a raw payload with the same required-field and length rules
    /// as [`NewUser::from_input`].
    pub fn from_input(input: UserInput) -> Result<Self, ValidationError> {
        let nombre = trimmed(input.nombre);
        let email = trimmed(input.email);

        if nombre.is_empty() || email.is_empty() {
            return Err(ValidationError::MissingRequired);
        }

        let update = Self {
            nombre,
            email,
            telefono: input.telefono.map(|v| v.trim().to_owned()),
            descripcion: input.descripcion.map(|v| v.trim().to_owned()),
        };

        check_len("nombre", &update.nombre, MAX_NOMBRE_LEN)?;
        check_len("email", &update.email, MAX_EMAIL_LEN)?;
        if let Some(telefono) = &update.telefono {
            check_len("telefono", telefono, MAX_TELEFONO_LEN)?;
        }

        Ok(update)
    }

    pub fn nombre(&self) -> &str {
        &self.nombre
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn telefono(&self) -> Option<&str> {
        self.telefono.as_deref()
    }

    pub fn descripcion(&self) -> Option<&str> {
        self.descripcion.as_deref()
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_owned()).unwrap_or_default()
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// RFC 3339 on the way out; on the way in also accepts offset-less
/// timestamps (Postgres `TIMESTAMP` columns), read as UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", raw)))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }
}

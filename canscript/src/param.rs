//! Scripting access to the parameter store
//!
//! The store itself belongs to the firmware and is reached through the [`ParamStore`] trait.
//! A [`Parameter`] is a typed reference into it that scripts read and write as `f32`. Only
//! scalar parameters are supported; values are converted to the stored type with saturating
//! truncation.

use crate::core::InvalidValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamType {
    Int8,
    Int16,
    Int32,
    Float,
    Vector3f,
    Group,
}

impl ParamType {
    pub const fn is_scalar(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Float)
    }
}

/// Firmware type code, as exposed to scripts
impl TryFrom<u8> for ParamType {
    type Error = InvalidValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Int8),
            2 => Ok(Self::Int16),
            3 => Ok(Self::Int32),
            4 => Ok(Self::Float),
            5 => Ok(Self::Vector3f),
            6 => Ok(Self::Group),
            _ => Err(InvalidValue),
        }
    }
}

/// Scalar parameter value in its stored representation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamValue {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Float(f32),
}

impl ParamValue {
    /// Converts a script value to the given type.
    ///
    /// Returns `None` for non-scalar types.
    pub fn from_f32(param_type: ParamType, value: f32) -> Option<Self> {
        let value = match param_type {
            ParamType::Int8 => Self::Int8(value as i8),
            ParamType::Int16 => Self::Int16(value as i16),
            ParamType::Int32 => Self::Int32(value as i32),
            ParamType::Float => Self::Float(value),
            ParamType::Vector3f | ParamType::Group => return None,
        };
        Some(value)
    }

    pub fn to_f32(self) -> f32 {
        match self {
            Self::Int8(value) => f32::from(value),
            Self::Int16(value) => f32::from(value),
            Self::Int32(value) => value as f32,
            Self::Float(value) => value,
        }
    }

    pub fn param_type(self) -> ParamType {
        match self {
            Self::Int8(_) => ParamType::Int8,
            Self::Int16(_) => ParamType::Int16,
            Self::Int32(_) => ParamType::Int32,
            Self::Float(_) => ParamType::Float,
        }
    }
}

/// Location of a parameter under a previous firmware layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConversionInfo {
    pub key: u16,
    pub group_element: u32,
    pub param_type: ParamType,
}

/// Firmware parameter storage
///
/// Methods take `&self`; the store is shared by every script and synchronizes internally.
pub trait ParamStore {
    type Key: Copy;

    /// Looks a parameter up by name.
    fn find(&self, name: &str) -> Option<(Self::Key, ParamType)>;

    /// Looks a parameter up by its location under a previous layout.
    fn find_old(&self, info: &ConversionInfo) -> Option<Self::Key>;

    fn get(&self, key: Self::Key) -> ParamValue;

    /// Sets the value in RAM only.
    fn set(&self, key: Self::Key, value: ParamValue);

    /// Persists the current value.
    fn save(&self, key: Self::Key);

    /// Changes the default value, unless the parameter was configured by the user.
    fn set_default(&self, key: Self::Key, value: ParamValue);

    /// Whether the parameter holds a user-configured value
    fn configured(&self, key: Self::Key) -> bool;
}

/// Typed reference to a stored parameter
///
/// A parameter that was never bound, or whose lookup failed, reports `false`/`None` on every
/// operation.
pub struct Parameter<'s, S: ParamStore + ?Sized> {
    store: &'s S,
    binding: Option<(S::Key, ParamType)>,
}

impl<'s, S: ParamStore + ?Sized> Parameter<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            binding: None,
        }
    }

    /// Binds to a parameter by name.
    pub fn init(&mut self, name: &str) -> bool {
        match self.store.find(name) {
            Some(binding) => {
                self.binding = Some(binding);
                true
            }
            None => {
                debug!("no parameter {}", name);
                false
            }
        }
    }

    /// Binds to a parameter by its location under a previous firmware layout.
    ///
    /// Only scalar types can be bound this way.
    pub fn init_by_info(&mut self, key: u16, group_element: u32, param_type: ParamType) -> bool {
        if !param_type.is_scalar() {
            return false;
        }
        let info = ConversionInfo {
            key,
            group_element,
            param_type,
        };
        match self.store.find_old(&info) {
            Some(key) => {
                self.binding = Some((key, param_type));
                true
            }
            None => false,
        }
    }

    pub fn param_type(&self) -> Option<ParamType> {
        self.binding.map(|(_, param_type)| param_type)
    }

    pub fn get(&self) -> Option<f32> {
        let (key, param_type) = self.scalar()?;
        let value = self.store.get(key);
        debug_assert_eq!(value.param_type(), param_type);
        Some(value.to_f32())
    }

    pub fn set(&mut self, value: f32) -> bool {
        let Some((key, value)) = self.convert(value) else {
            return false;
        };
        self.store.set(key, value);
        true
    }

    pub fn set_and_save(&mut self, value: f32) -> bool {
        let Some((key, value)) = self.convert(value) else {
            return false;
        };
        self.store.set(key, value);
        self.store.save(key);
        true
    }

    pub fn set_default(&mut self, value: f32) -> bool {
        let Some((key, value)) = self.convert(value) else {
            return false;
        };
        self.store.set_default(key, value);
        true
    }

    pub fn configured(&self) -> bool {
        self.binding
            .is_some_and(|(key, _)| self.store.configured(key))
    }

    fn scalar(&self) -> Option<(S::Key, ParamType)> {
        self.binding
            .filter(|(_, param_type)| param_type.is_scalar())
    }

    fn convert(&self, value: f32) -> Option<(S::Key, ParamValue)> {
        let (key, param_type) = self.scalar()?;
        Some((key, ParamValue::from_f32(param_type, value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    struct Entry {
        name: &'static str,
        value: ParamValue,
        default: ParamValue,
        saved: bool,
        configured: bool,
    }

    struct Store(RefCell<[Entry; 3]>);

    impl Store {
        fn new() -> Self {
            Self(RefCell::new([
                Entry {
                    name: "SCR_USER1",
                    value: ParamValue::Float(1.5),
                    default: ParamValue::Float(0.0),
                    saved: false,
                    configured: false,
                },
                Entry {
                    name: "CAN_D1_PROTOCOL",
                    value: ParamValue::Int8(1),
                    default: ParamValue::Int8(1),
                    saved: false,
                    configured: true,
                },
                Entry {
                    name: "INS_ACCOFFS",
                    value: ParamValue::Float(0.0),
                    default: ParamValue::Float(0.0),
                    saved: false,
                    configured: false,
                },
            ]))
        }
    }

    impl ParamStore for Store {
        type Key = usize;

        fn find(&self, name: &str) -> Option<(usize, ParamType)> {
            let entries = self.0.borrow();
            let index = entries.iter().position(|entry| entry.name == name)?;
            let param_type = match index {
                2 => ParamType::Vector3f,
                _ => entries[index].value.param_type(),
            };
            Some((index, param_type))
        }

        fn find_old(&self, info: &ConversionInfo) -> Option<usize> {
            (info.key == 97 && info.param_type == ParamType::Int8).then_some(1)
        }

        fn get(&self, key: usize) -> ParamValue {
            self.0.borrow()[key].value
        }

        fn set(&self, key: usize, value: ParamValue) {
            self.0.borrow_mut()[key].value = value;
        }

        fn save(&self, key: usize) {
            let mut entries = self.0.borrow_mut();
            entries[key].saved = true;
            entries[key].configured = true;
        }

        fn set_default(&self, key: usize, value: ParamValue) {
            let mut entries = self.0.borrow_mut();
            entries[key].default = value;
            if !entries[key].configured {
                entries[key].value = value;
            }
        }

        fn configured(&self, key: usize) -> bool {
            self.0.borrow()[key].configured
        }
    }

    #[test]
    fn test_unbound() {
        let store = Store::new();
        let mut param = Parameter::new(&store);
        assert!(!param.init("NO_SUCH_PARAM"));
        assert_eq!(param.get(), None);
        assert!(!param.set(1.0));
        assert!(!param.set_and_save(1.0));
        assert!(!param.set_default(1.0));
        assert!(!param.configured());
    }

    #[test]
    fn test_float_parameter() {
        let store = Store::new();
        let mut param = Parameter::new(&store);
        assert!(param.init("SCR_USER1"));
        assert_eq!(param.get(), Some(1.5));
        assert!(!param.configured());

        assert!(param.set(2.25));
        assert_eq!(param.get(), Some(2.25));
        assert!(!store.0.borrow()[0].saved);

        assert!(param.set_and_save(3.0));
        assert!(store.0.borrow()[0].saved);
        assert!(param.configured());

        // Configured parameters keep their value
        assert!(param.set_default(7.0));
        assert_eq!(param.get(), Some(3.0));
        assert_eq!(store.0.borrow()[0].default, ParamValue::Float(7.0));
    }

    #[test]
    fn test_integer_conversion_saturates() {
        let store = Store::new();
        let mut param = Parameter::new(&store);
        assert!(param.init("CAN_D1_PROTOCOL"));
        assert_eq!(param.param_type(), Some(ParamType::Int8));

        assert!(param.set(3.9));
        assert_eq!(param.get(), Some(3.0));
        assert!(param.set(1000.0));
        assert_eq!(param.get(), Some(127.0));
        assert!(param.set(-1000.0));
        assert_eq!(param.get(), Some(-128.0));
    }

    #[test]
    fn test_vector_parameter_not_supported() {
        let store = Store::new();
        let mut param = Parameter::new(&store);
        assert!(param.init("INS_ACCOFFS"));
        assert_eq!(param.get(), None);
        assert!(!param.set(1.0));
        assert!(!param.configured());
    }

    #[test]
    fn test_type_codes() {
        assert_eq!(ParamType::try_from(1).ok(), Some(ParamType::Int8));
        assert_eq!(ParamType::try_from(4).ok(), Some(ParamType::Float));
        assert_eq!(ParamType::try_from(6).ok(), Some(ParamType::Group));
        assert!(ParamType::try_from(0).is_err());
        assert!(ParamType::try_from(7).is_err());
    }

    #[test]
    fn test_init_by_info() {
        let store = Store::new();
        let mut param = Parameter::new(&store);
        assert!(!param.init_by_info(97, 0, ParamType::Group));
        assert!(!param.init_by_info(12, 0, ParamType::Int8));
        assert!(param.init_by_info(97, 0, ParamType::Int8));
        assert_eq!(param.get(), Some(1.0));
    }
}

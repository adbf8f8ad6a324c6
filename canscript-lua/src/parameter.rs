use canscript::param::{ParamStore, ParamType, Parameter};
use mlua::{Lua, Result as LuaResult, UserData, UserDataMethods, Variadic};

/// Name of the global constructor
pub const PARAMETER_NAME: &str = "Parameter";

/// Lua userdata wrapping a parameter handle.
///
/// Methods exposed to scripts:
/// - `p:init(name)` → bool
/// - `p:init_by_info(key, group_element, type)` → bool
/// - `p:get()` → number or nil
/// - `p:set(value)`, `p:set_and_save(value)`, `p:set_default(value)` → bool
/// - `p:configured()` → bool
pub struct LuaParameter<S: ParamStore + 'static>(Parameter<'static, S>);

impl<S: ParamStore + 'static> UserData for LuaParameter<S> {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method_mut("init", |_, this, name: String| Ok(this.0.init(&name)));

        methods.add_method_mut(
            "init_by_info",
            |_, this, (key, group_element, code): (u16, u32, u8)| {
                let Ok(param_type) = ParamType::try_from(code) else {
                    return Ok(false);
                };
                Ok(this.0.init_by_info(key, group_element, param_type))
            },
        );

        methods.add_method("get", |_, this, ()| Ok(this.0.get()));
        methods.add_method_mut("set", |_, this, value: f32| Ok(this.0.set(value)));
        methods.add_method_mut("set_and_save", |_, this, value: f32| {
            Ok(this.0.set_and_save(value))
        });
        methods.add_method_mut("set_default", |_, this, value: f32| {
            Ok(this.0.set_default(value))
        });
        methods.add_method("configured", |_, this, ()| Ok(this.0.configured()));
    }
}

/// Registers the `Parameter` constructor in the Lua globals.
///
/// `Parameter()` returns an unbound handle; `Parameter(name)` binds it and raises
/// `"No parameter: <name>"` if the store has no such parameter.
///
/// # Errors
///
/// Returns error if function creation or global registration fails.
pub fn register_parameter<S: ParamStore + 'static>(lua: &Lua, store: &'static S) -> LuaResult<()> {
    let constructor = lua.create_function(move |_, args: Variadic<String>| {
        if args.len() > 1 {
            return Err(mlua::Error::RuntimeError("too many arguments".into()));
        }
        let mut parameter = Parameter::new(store);
        if let Some(name) = args.first()
            && !parameter.init(name)
        {
            tracing::debug!(name = %name, "parameter lookup failed");
            return Err(mlua::Error::RuntimeError(format!("No parameter: {name}")));
        }
        Ok(LuaParameter(parameter))
    })?;
    lua.globals().set(PARAMETER_NAME, constructor)
}

use canscript::broker::{Broker, HandleError};
use canscript::core::{DataTypeId, NodeId, Signature};
use canscript::handle::Handle;
use embassy_sync::blocking_mutex::raw::RawMutex;
use mlua::{IntoLuaMulti, Lua, MultiValue, Result as LuaResult, UserData, UserDataMethods};

/// Name of the global constructor table
pub const CAN_HANDLE_NAME: &str = "CAN_Handle";

/// Alias of [`CAN_HANDLE_NAME`] used by existing firmware scripts
pub const DRONECAN_HANDLE_NAME: &str = "DroneCAN_Handle";

/// Lua userdata wrapping a broker handle.
///
/// Methods exposed to scripts:
/// - `h:broadcast(payload)` → bool
/// - `h:request(node, payload)` → bool
/// - `h:subscribe()` → bool
/// - `h:check_message()` → payload, node or nothing
/// - `h:canfd()` → bool, `h:canfd(enabled)` → bool
/// - `h:close()` → nothing
///
/// Calls on a closed handle raise `"handle closed"`.
pub struct LuaHandle<M: RawMutex + 'static>(Option<Handle<'static, M>>);

impl<M: RawMutex + 'static> LuaHandle<M> {
    fn handle(&mut self) -> LuaResult<&mut Handle<'static, M>> {
        self.0
            .as_mut()
            .ok_or_else(|| mlua::Error::RuntimeError("handle closed".into()))
    }
}

impl<M: RawMutex + 'static> UserData for LuaHandle<M> {
    fn add_methods<T: UserDataMethods<Self>>(methods: &mut T) {
        methods.add_method_mut("broadcast", |_, this, payload: mlua::String| {
            Ok(this.handle()?.broadcast(&payload.as_bytes()))
        });

        methods.add_method_mut(
            "request",
            |_, this, (node, payload): (u8, mlua::String)| {
                let target = NodeId::new(node)
                    .ok_or_else(|| mlua::Error::RuntimeError(format!("invalid node id: {node}")))?;
                Ok(this.handle()?.request(target, &payload.as_bytes()))
            },
        );

        methods.add_method_mut("subscribe", |_, this, ()| Ok(this.handle()?.subscribe()));

        methods.add_method_mut("check_message", |lua, this, ()| {
            match this.handle()?.check_message() {
                Some(message) => {
                    let payload = lua.create_string(&message.payload)?;
                    (payload, message.source.into_u8()).into_lua_multi(lua)
                }
                None => Ok(MultiValue::new()),
            }
        });

        methods.add_method_mut("canfd", |_, this, enabled: Option<bool>| {
            let handle = this.handle()?;
            Ok(match enabled {
                Some(enabled) => handle.set_canfd(enabled),
                None => handle.canfd(),
            })
        });

        // Closing twice is allowed
        methods.add_method_mut("close", |_, this, ()| {
            if let Some(mut handle) = this.0.take() {
                handle.close();
                tracing::debug!(
                    bus = handle.bus(),
                    data_type = handle.data_type().into_u16(),
                    "closed CAN handle"
                );
            }
            Ok(())
        });
    }
}

/// Registers the `CAN_Handle` constructor table in the Lua globals, also as `DroneCAN_Handle`.
///
/// `CAN_Handle.new(bus, signature, data_type)` raises `"Invalid DroneCAN bus: <bus>"` if no
/// driver is attached at `bus`. The 64-bit signature is taken as a Lua integer and
/// reinterpreted, so signatures above `math.maxinteger` can be written as hex literals.
///
/// # Errors
///
/// Returns error if table creation or global registration fails.
pub fn register_can_handle<M: RawMutex + 'static>(
    lua: &Lua,
    broker: &'static Broker<'static, M>,
) -> LuaResult<()> {
    let class = lua.create_table()?;
    class.set(
        "new",
        lua.create_function(
            move |_, (bus, signature, data_type): (i64, i64, u16)| {
                let invalid_bus =
                    || mlua::Error::RuntimeError(format!("Invalid DroneCAN bus: {bus}"));
                let index = usize::try_from(bus).map_err(|_| invalid_bus())?;
                let handle = broker
                    .handle(
                        index,
                        Signature::new(signature as u64),
                        DataTypeId::new(data_type),
                    )
                    .map_err(|err| match err {
                        HandleError::InvalidBus => invalid_bus(),
                        HandleError::NoHandleSlotLeft => {
                            mlua::Error::RuntimeError("no CAN handle slot left".into())
                        }
                    })?;
                tracing::debug!(bus, data_type, "opened CAN handle");
                Ok(LuaHandle(Some(handle)))
            },
        )?,
    )?;
    lua.globals().set(DRONECAN_HANDLE_NAME, class.clone())?;
    lua.globals().set(CAN_HANDLE_NAME, class)
}

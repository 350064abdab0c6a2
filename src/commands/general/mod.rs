/// Submodule defining the `/ping` command.
pub(crate) mod ping;

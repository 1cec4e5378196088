pub(crate) mod caption;
pub(crate) mod composite;
pub(crate) mod compositor;
pub(crate) mod frame;

/// Finding which panoramas need a transition and where their depth maps live.
pub mod discovery;

pub mod core {
    pub mod config;
    pub mod error;
    pub mod hardware;
    pub mod logging;
    pub mod monitor;
    pub mod probe;
    pub mod runner;
    pub mod test;
    pub mod v4l2;
}


pub mod tests {
    pub mod camera;
    pub mod cpu;
    pub mod display;
    pub mod form_factor;
    pub mod gpio;
    pub mod gpu;
    pub mod memory;
    pub mod networking;
    pub mod power;
    pub mod storage;
    pub mod usb;
}


pub mod reporters;

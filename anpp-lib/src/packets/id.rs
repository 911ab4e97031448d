use std::fmt::Display;

macro_rules! packet_ids {
    ($( $variant:ident = $value:literal => $name:literal, )+) => {
        value_enum! {
            /// Every packet id declared by the protocol, whether or not a codec exists
            /// for it.
            pub enum PacketId: u8 {
                $( $variant = $value ),+
            }
        }

        impl PacketId {
            /// Protocol name of the packet, e.g., `system_state`.
            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $( PacketId::$variant => $name ),+
                }
            }
        }
    };
}

packet_ids! {
    Acknowledge = 0 => "acknowledge",
    Request = 1 => "request",
    BootMode = 2 => "boot_mode",
    DeviceInformation = 3 => "device_information",
    RestoreFactorySettings = 4 => "restore_factory_settings",
    Reset = 5 => "reset",
    Print = 6 => "print",
    FileTransferRequest = 7 => "file_transfer_request",
    FileTransferAcknowledge = 8 => "file_transfer_acknowledge",
    FileTransfer = 9 => "file_transfer",
    SerialPortPassthrough = 10 => "serial_port_passthrough",
    IpConfiguration = 11 => "ip_configuration",
    ExtendedDeviceInformation = 13 => "extended_device_information",
    SubcomponentInformation = 14 => "subcomponent_information",

    SystemState = 20 => "system_state",
    UnixTime = 21 => "unix_time",
    FormattedTime = 22 => "formatted_time",
    Status = 23 => "status",
    PositionStandardDeviation = 24 => "position_standard_deviation",
    VelocityStandardDeviation = 25 => "velocity_standard_deviation",
    EulerOrientationStandardDeviation = 26 => "euler_orientation_standard_deviation",
    QuaternionOrientationStandardDeviation = 27 => "quaternion_orientation_standard_deviation",
    RawSensors = 28 => "raw_sensors",
    RawGnss = 29 => "raw_gnss",
    Satellites = 30 => "satellites",
    DetailedSatellites = 31 => "detailed_satellites",
    GeodeticPosition = 32 => "geodetic_position",
    EcefPosition = 33 => "ecef_position",
    UtmPosition = 34 => "utm_position",
    NedVelocity = 35 => "ned_velocity",
    BodyVelocity = 36 => "body_velocity",
    Acceleration = 37 => "acceleration",
    BodyAcceleration = 38 => "body_acceleration",
    EulerOrientation = 39 => "euler_orientation",
    QuaternionOrientation = 40 => "quaternion_orientation",
    DcmOrientation = 41 => "dcm_orientation",
    AngularVelocity = 42 => "angular_velocity",
    AngularAcceleration = 43 => "angular_acceleration",
    ExternalPositionVelocity = 44 => "external_position_velocity",
    ExternalPosition = 45 => "external_position",
    ExternalVelocity = 46 => "external_velocity",
    ExternalBodyVelocity = 47 => "external_body_velocity",
    ExternalHeading = 48 => "external_heading",
    RunningTime = 49 => "running_time",
    LocalMagneticField = 50 => "local_magnetic_field",
    OdometerState = 51 => "odometer_state",
    ExternalTime = 52 => "external_time",
    ExternalDepth = 53 => "external_depth",
    GeoidHeight = 54 => "geoid_height",
    RtcmCorrections = 55 => "rtcm_corrections",
    Wind = 57 => "wind",
    Heave = 58 => "heave",
    RawSatelliteData = 60 => "raw_satellite_data",
    RawSatelliteEphemeris = 61 => "raw_satellite_ephemeris",
    Depth = 62 => "depth",
    WaterProfiling = 63 => "water_profiling",
    ExternalUsbl = 64 => "external_usbl",
    SpeedOfSound = 65 => "speed_of_sound",
    Lockheed = 66 => "lockheed",
    ExternalOdometer = 67 => "external_odometer",
    ExternalAirData = 68 => "external_air_data",
    GnssReceiverInformation = 69 => "gnss_receiver_information",
    RawDvlData = 70 => "raw_dvl_data",
    NorthSeekingInitialisationStatus = 71 => "north_seeking_initialisation_status",
    GimbalState = 72 => "gimbal_state",
    Automotive = 73 => "automotive",
    ExternalMagnetometers = 75 => "external_magnetometers",
    BaseStation = 80 => "base_station",
    ZeroAngularVelocity = 83 => "zero_angular_velocity",
    ExtendedSatellites = 84 => "extended_satellites",
    SensorTemperatures = 85 => "sensor_temperatures",

    PacketTimerPeriod = 180 => "packet_timer_period",
    PacketsPeriod = 181 => "packets_period",
    BaudRates = 182 => "baud_rates",
    BusConfiguration = 183 => "bus_configuration",
    SensorRanges = 184 => "sensor_ranges",
    InstallationAlignment = 185 => "installation_alignment",
    FilterOptions = 186 => "filter_options",
    AdvancedFilterParameters = 187 => "advanced_filter_parameters",
    GpioConfiguration = 188 => "gpio_configuration",
    MagneticCalibrationValues = 189 => "magnetic_calibration_values",
    MagneticCalibrationConfiguration = 190 => "magnetic_calibration_configuration",
    MagneticCalibrationStatus = 191 => "magnetic_calibration_status",
    OdometerConfiguration = 192 => "odometer_configuration",
    SetZeroOrientationAlignment = 193 => "set_zero_orientation_alignment",
    ReferencePointOffsets = 194 => "reference_point_offsets",
    GpioOutputConfiguration = 195 => "gpio_output_configuration",
    DualAntennaConfiguration = 196 => "dual_antenna_configuration",
    GnssConfiguration = 197 => "gnss_configuration",
    UserData = 198 => "user_data",
    GpioInputConfiguration = 199 => "gpio_input_configuration",
    IpDataportsConfiguration = 202 => "ip_dataports_configuration",
    CanConfiguration = 203 => "can_configuration",
}

impl PacketId {
    /// Whether `id` is declared by the protocol.
    #[must_use]
    pub fn is_known(id: u8) -> bool {
        PacketId::try_from(id).is_ok()
    }
}

impl Display for PacketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub mod vlan;

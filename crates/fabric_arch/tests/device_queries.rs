//! Integration tests for opening devices and resolving names.

mod common;

use common::{bel, clock_chip, clock_device, open, wire};
use fabric_arch::{Context, Device, PipId, Strength, WireId};
use fabric_chipdb::{write_chipdb, ChipDbBuilder, ChipFamily, PinDir};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

#[test]
fn every_bel_name_round_trips() {
    let dev = clock_device();
    let mut seen = 0;
    for b in dev.bels() {
        let name = dev.bel_name(b);
        assert_eq!(dev.bel_by_name(&name), Some(b), "bel {name}");
        assert_eq!(dev.bel_by_location(dev.bel_location(b)), Some(b));
        seen += 1;
    }
    assert_eq!(seen, 7);
}

#[test]
fn every_pip_name_round_trips() {
    let dev = clock_device();
    for tile in 0..dev.tile_count() {
        let x = dev.tile_xy(tile).0;
        let count = match x {
            0 => 1,
            1 => 2,
            2 | 3 => 4,
            _ => 1,
        };
        for index in 0..count {
            let pip = PipId { tile, index };
            let name = dev.pip_name(pip);
            assert_eq!(dev.pip_by_name(&name), Some(pip), "pip {name}");
        }
    }
}

#[test]
fn lookups_are_deterministic() {
    let a = clock_device();
    let b = clock_device();
    for name in ["CLBLL_L_X2Y0/CK_IN", "CLBLL_L_X3Y0/LONG", "INT_L_X4Y0/SINGLE_IN"] {
        let (wa, wb) = (wire(&a, name), wire(&b, name));
        assert_eq!(wa, wb);
        assert_eq!(a.wire_name(wa), b.wire_name(wb));
    }
    let names_a: Vec<String> = a.bels().map(|b| a.bel_name(b)).collect();
    let names_b: Vec<String> = b.bels().map(|x| b.bel_name(x)).collect();
    assert_eq!(names_a, names_b);
}

#[test]
fn unknown_names_resolve_to_nothing() {
    let dev = clock_device();
    assert_eq!(dev.wire_by_name("CLBLL_L_X2Y0/NO_SUCH_WIRE"), None);
    assert_eq!(dev.wire_by_name("NO_SUCH_TILE/CK_IN"), None);
    assert_eq!(dev.wire_by_name("no separator"), None);
    assert_eq!(dev.bel_by_name("SLICE_X9Y9/AFF"), None);
    assert_eq!(dev.bel_by_name("SLICE_X0Y0/ZFF"), None);
    assert_eq!(dev.pip_by_name("CLBLL_L_X2Y0/9.9"), None);
    assert_eq!(dev.pip_by_name("SITEPIP/SLICE_X0Y0/A6LUT/A1"), None);
    assert_eq!(dev.tile_by_name("INT_R_X0Y0"), None);
    assert_eq!(dev.site_by_name("SLICE_X7Y0"), None);
    assert_eq!(dev.package_pin_site("E3"), None);
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

#[test]
fn node_members_name_the_same_wire() {
    let dev = clock_device();
    let from_row = wire(&dev, "CLK_HROW_TOP_R_X1Y0/HROW_OUT");
    let from_slice = wire(&dev, "CLBLL_L_X2Y0/LEAF");
    assert_eq!(from_row, from_slice);
    assert!(matches!(from_row, WireId::Node(_)));
    assert_eq!(dev.wire_name(from_slice), "CLK_HROW_TOP_R_X1Y0/HROW_OUT");
    assert_eq!(dev.wire_member_count(from_row), 2);

    // tile 3's leaf is not part of the node
    let lone = wire(&dev, "CLBLL_L_X3Y0/LEAF");
    assert!(matches!(lone, WireId::Tile { tile: 3, .. }));
    assert_ne!(lone, from_row);
}

#[test]
fn node_pips_span_members() {
    let dev = clock_device();
    let leaf = wire(&dev, "CLBLL_L_X2Y0/LEAF");
    let uphill: Vec<PipId> = dev.pips_uphill(leaf).collect();
    assert_eq!(uphill.len(), 1);
    assert_eq!(dev.tile_name(uphill[0].tile), "CLK_HROW_TOP_R_X1Y0");
    let downhill: Vec<PipId> = dev.pips_downhill(leaf).collect();
    assert_eq!(downhill.len(), 1);
    assert_eq!(dev.pip_dst_wire(downhill[0]), wire(&dev, "CLBLL_L_X2Y0/CK_IN"));

    let vcc = wire(&dev, "CLBLL_L_X3Y0/TIE_VCC");
    assert_eq!(dev.wire_member_count(vcc), 3);
    assert_eq!(dev.pips_downhill(vcc).count(), 2);
    assert_eq!(dev.wire_intent(vcc), dev.id("PSEUDO_VCC"));
}

#[test]
fn bel_pins_resolve_to_canonical_wires() {
    let dev = clock_device();
    let buf = bel(&dev, "BUFGCTRL_X0Y0/BUFGCTRL");
    let out = dev.bel_pin_wire(buf, dev.id("O")).unwrap();
    assert_eq!(out, wire(&dev, "CLK_HROW_TOP_R_X1Y0/HROW_IN"));
    assert_eq!(dev.bel_pin_type(buf, dev.id("O")), PinDir::Output);
    assert_eq!(dev.bel_pin_wire(buf, dev.id("I1")), None);
    assert!(!dev.is_logic_tile(buf));
    assert!(dev.is_logic_tile(bel(&dev, "SLICE_X1Y0/AFF")));
}

// ---------------------------------------------------------------------------
// Blacklist
// ---------------------------------------------------------------------------

fn cmt_chip(name: &str) -> Device {
    let mut b = ChipDbBuilder::new(name, 1, 1);
    let tt = b.add_tile_type("HCLK_CMT_L");
    let ck = b.add_wire(tt, "HCLK_CMT_CK_IN0", "NODE_GLOBAL_HCLK");
    let freq = b.add_wire(tt, "HCLK_CMT_FREQ_REF_NS0", "NODE_GLOBAL_HCLK");
    let mux = b.add_wire(tt, "HCLK_CMT_MUX_OUT", "NODE_GLOBAL_HCLK");
    b.add_pip(tt, ck, freq);
    b.add_pip(tt, ck, mux);
    b.set_tile(0, 0, "HCLK_CMT_L_X0Y0", tt);
    open(b.finish())
}

#[test]
fn blacklisted_pips_are_never_available() {
    let dev = cmt_chip("xc7a35t");
    assert_eq!(dev.family(), ChipFamily::Xc7);
    assert_eq!(dev.blacklist().len(), 1);

    let freq_ref = PipId { tile: 0, index: 0 };
    let mux = PipId { tile: 0, index: 1 };
    assert!(dev.is_pip_blacklisted(freq_ref));
    assert!(!dev.is_pip_blacklisted(mux));

    let mut ctx = Context::new(dev);
    let net = ctx.netlist.add_net("clk");
    assert!(!ctx.check_pip_avail(freq_ref));
    assert!(!ctx.check_pip_avail_for_net(freq_ref, net));
    assert!(ctx.check_pip_avail(mux));
    assert_eq!(
        ctx.bind_pip(freq_ref, net, Strength::Locked),
        Err(fabric_arch::BindError::Blacklisted(freq_ref))
    );
    assert_eq!(ctx.bound_pip_count(), 0);
    ctx.bind_pip(mux, net, Strength::Strong).unwrap();
    assert!(!ctx.check_pip_avail(mux));
    assert!(ctx.check_pip_avail_for_net(mux, net));
}

#[test]
fn other_families_have_no_blacklist() {
    let dev = cmt_chip("xcku040");
    assert_eq!(dev.family(), ChipFamily::UltraScale);
    assert!(dev.blacklist().is_empty());
    assert!(!dev.is_pip_blacklisted(PipId { tile: 0, index: 0 }));
}

// ---------------------------------------------------------------------------
// I/O clock regions
// ---------------------------------------------------------------------------

/// `LIOB33 | LIOI3 | HCLK_IOI3 | RIOB33`, with the I/O tile's clock wire
/// joined to the HCLK tile's output.
fn io_device() -> Device {
    let mut b = ChipDbBuilder::new("xc7io", 4, 1);
    let liob = b.add_tile_type("LIOB33");
    let pad = b.add_wire(liob, "IOB_PAD", "NODE_OUTPUT");
    let iob = b.add_bel(liob, "PAD", "PAD", 0, Some(0));
    b.add_bel_pin(liob, iob, "PAD", pad, PinDir::Inout);

    let lioi = b.add_tile_type("LIOI3");
    let ioclk = b.add_wire(lioi, "IOI_IOCLK0", "NODE_GLOBAL_HCLK");

    let hclk = b.add_tile_type("HCLK_IOI3");
    let hclk_in = b.add_wire(hclk, "HCLK_IOI_CK_BUFHCLK0", "NODE_GLOBAL_HCLK");
    let hclk_out = b.add_wire(hclk, "HCLK_IOI_IOCLK0", "NODE_GLOBAL_HCLK");
    b.add_pip(hclk, hclk_in, hclk_out);

    let riob = b.add_tile_type("RIOB33");
    let rpad = b.add_wire(riob, "IOB_PAD", "NODE_OUTPUT");
    let riob_bel = b.add_bel(riob, "PAD", "PAD", 0, Some(0));
    b.add_bel_pin(riob, riob_bel, "PAD", rpad, PinDir::Inout);

    let t0 = b.set_tile(0, 0, "LIOB33_X0Y0", liob);
    b.add_site(t0, "IOB_X0Y0", "IOB33", "E3", None);
    let t1 = b.set_tile(1, 0, "LIOI3_X0Y0", lioi);
    let t2 = b.set_tile(2, 0, "HCLK_IOI3_X1Y0", hclk);
    let t3 = b.set_tile(3, 0, "RIOB33_X3Y0", riob);
    b.add_site(t3, "IOB_X1Y0", "IOB33", "F4", None);
    b.add_node("NODE_GLOBAL_HCLK", &[(t2, hclk_out), (t1, ioclk)]);
    open(b.finish())
}

#[test]
fn hclk_found_through_io_tile() {
    let dev = io_device();
    let pad = bel(&dev, "IOB_X0Y0/PAD");
    assert_eq!(dev.bel_package_pin(pad), Some("E3"));
    assert_eq!(dev.package_pin_site("E3"), Some("IOB_X0Y0"));
    assert_eq!(dev.hclk_for_iob(pad).unwrap(), 2);
    assert_eq!(dev.hclk_for_ioi(1).unwrap(), 2);
}

#[test]
fn hclk_missing_clock_wire_is_error() {
    let dev = io_device();
    // the right-hand IOB's neighbour is the HCLK tile itself
    let pad = bel(&dev, "IOB_X1Y0/PAD");
    let err = dev.hclk_for_iob(pad).unwrap_err();
    assert!(err.to_string().contains("IOI_IOCLK0"), "{err}");
}

// ---------------------------------------------------------------------------
// Loading from disk
// ---------------------------------------------------------------------------

fn assert_same_fabric(loaded: &Device, reference: &Device) {
    assert_eq!(loaded.chip_name(), "xc7clk");
    assert_eq!(loaded.family(), ChipFamily::Xc7);
    assert_eq!((loaded.width(), loaded.height()), (5, 1));
    for name in ["CLBLL_L_X2Y0/LEAF", "CLBLL_L_X3Y0/CK_IN", "INT_L_X4Y0/IMUX_OUT"] {
        assert_eq!(wire(loaded, name), wire(reference, name));
    }
    let names: Vec<String> = loaded.bels().map(|b| loaded.bel_name(b)).collect();
    let expected: Vec<String> = reference.bels().map(|b| reference.bel_name(b)).collect();
    assert_eq!(names, expected);
}

#[test]
fn load_plain_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("xc7clk.bin");
    write_chipdb(&path, &clock_chip(), false).unwrap();
    let loaded = Device::load(&path).unwrap();
    assert_same_fabric(&loaded, &clock_device());
}

#[test]
fn load_compressed_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("xc7clk.bin.gz");
    write_chipdb(&path, &clock_chip(), true).unwrap();
    let loaded = Device::load(&path).unwrap();
    assert_same_fabric(&loaded, &clock_device());
}

#[test]
fn load_missing_database_fails() {
    let dir = TempDir::new().unwrap();
    assert!(Device::load(&dir.path().join("absent.bin")).is_err());
}

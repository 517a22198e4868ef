//! Device fixtures shared by the integration tests.
//!
//! Every fixture is built with [`ChipDbBuilder`] so the tests never need a
//! real part database on disk.

#![allow(dead_code)]

use fabric_arch::{BelId, CellId, Context, Device, Strength, WireId};
use fabric_chipdb::{ChipDb, ChipDbBuilder, ChipInfo, PinDir};
use fabric_common::ContentHash;

/// Opens a finished record as a device.
pub fn open(info: ChipInfo) -> Device {
    let db = ChipDb::new(info, ContentHash::from_bytes(b"fixture")).unwrap();
    Device::new(db).unwrap()
}

/// Resolves a `<tile>/<wire>` name, panicking on typos in the test itself.
pub fn wire(dev: &Device, name: &str) -> WireId {
    dev.wire_by_name(name)
        .unwrap_or_else(|| panic!("fixture has no wire {name}"))
}

/// Resolves a `<site>/<bel>` name.
pub fn bel(dev: &Device, name: &str) -> BelId {
    dev.bel_by_name(name)
        .unwrap_or_else(|| panic!("fixture has no bel {name}"))
}

/// Adds a cell with the given ports and places it on a bel.
pub fn place_cell(
    ctx: &mut Context,
    name: &str,
    cell_type: &str,
    bel_name: &str,
    ports: &[(&str, PinDir)],
) -> CellId {
    let ty = ctx.id(cell_type);
    let cell = ctx.netlist.add_cell(name, ty).unwrap();
    for &(port, dir) in ports {
        let port = ctx.id(port);
        ctx.netlist.add_port(cell, port, dir);
    }
    let target = bel(ctx.device(), bel_name);
    ctx.bind_bel(target, cell, Strength::Strong).unwrap();
    cell
}

/// Connects `cell.port` to the named net, creating the net on first use.
pub fn connect(ctx: &mut Context, cell: CellId, port: &str, net: &str) {
    let net = match ctx.netlist.net_by_name(net) {
        Some(n) => n,
        None => ctx.netlist.add_net(net),
    };
    let port = ctx.id(port);
    ctx.netlist.connect(cell, port, net).unwrap();
}

// ---------------------------------------------------------------------------
// Row of interconnect tiles
// ---------------------------------------------------------------------------

/// `width` interconnect tiles `INT_L_X<x>Y0` on one row, each with a
/// single, a pin feed, a pin bounce and a slice output wire. No nodes.
pub fn row_device(width: u32) -> Device {
    let mut b = ChipDbBuilder::new("xc7row", width, 1);
    let tt = b.add_tile_type("INT_L");
    let single = b.add_wire(tt, "SINGLE", "NODE_SINGLE");
    let feed = b.add_wire(tt, "FEED", "NODE_PINFEED");
    b.add_wire(tt, "BOUNCE", "NODE_PINBOUNCE");
    b.add_wire(tt, "CLE_OUT", "NODE_CLE_OUTPUT");
    b.add_pip(tt, single, feed);
    for x in 0..width {
        b.set_tile(x, 0, &format!("INT_L_X{x}Y0"), tt);
    }
    open(b.finish())
}

// ---------------------------------------------------------------------------
// Clock and tie-off fabric
// ---------------------------------------------------------------------------

/// A five tile row with a global clock buffer, a clock row, two slices and
/// an interconnect tile:
///
/// ```text
/// x=0 CLK_BUFG_TOP_R  BUFGCTRL_X0Y0/BUFGCTRL   O -> node BUFG
/// x=1 CLK_HROW_TOP_R  BUFG -> LEAF (row leaf), BUFG -> LONG (horizontal long)
///                     VCC/O, GND/O tie-offs
/// x=2 CLBLL_L         LEAF -> CK_IN, LONG -> CK_IN, TIE_VCC -> A1_IN, TIE_GND -> A2_IN
/// x=3 CLBLL_L         same, but its LEAF is not driven; LONG joins the long line
/// x=4 INT_L           SINGLE -> IMUX, IMUX joins the buffer's I0 feed
/// ```
pub fn clock_device() -> Device {
    open(clock_chip())
}

/// The record behind [`clock_device`].
pub fn clock_chip() -> ChipInfo {
    let mut b = ChipDbBuilder::new("xc7clk", 5, 1);

    let bufg = b.add_tile_type("CLK_BUFG_TOP_R");
    let bufg_i0 = b.add_wire(bufg, "BUFG_I0", "INTENT_DEFAULT");
    let bufg_o = b.add_wire(bufg, "BUFG_O", "NODE_GLOBAL_BUFG");
    let bufg_imux = b.add_wire(bufg, "BUFG_IMUX", "NODE_PINFEED");
    b.add_pip(bufg, bufg_imux, bufg_i0);
    let buf = b.add_bel(bufg, "BUFGCTRL", "BUFGCTRL", 0, Some(0));
    b.add_bel_pin(bufg, buf, "I0", bufg_i0, PinDir::Input);
    b.add_bel_pin(bufg, buf, "O", bufg_o, PinDir::Output);

    let hrow = b.add_tile_type("CLK_HROW_TOP_R");
    let hrow_in = b.add_wire(hrow, "HROW_IN", "NODE_GLOBAL_BUFG");
    let hrow_out = b.add_wire(hrow, "HROW_OUT", "NODE_GLOBAL_LEAF");
    let hlong = b.add_wire(hrow, "HLONG_SRC", "NODE_HLONG");
    let vcc_wire = b.add_wire(hrow, "VCC_WIRE", "PSEUDO_VCC");
    let gnd_wire = b.add_wire(hrow, "GND_WIRE", "PSEUDO_GND");
    b.add_pip(hrow, hrow_in, hrow_out);
    b.add_pip(hrow, hrow_in, hlong);
    let vcc = b.add_bel(hrow, "VCC", "PSEUDO_VCC", 0, None);
    b.add_bel_pin(hrow, vcc, "O", vcc_wire, PinDir::Output);
    let gnd = b.add_bel(hrow, "GND", "PSEUDO_GND", 1, None);
    b.add_bel_pin(hrow, gnd, "O", gnd_wire, PinDir::Output);

    let clb = b.add_tile_type("CLBLL_L");
    let leaf = b.add_wire(clb, "LEAF", "NODE_GLOBAL_LEAF");
    let long = b.add_wire(clb, "LONG", "NODE_HLONG");
    let ck_in = b.add_wire(clb, "CK_IN", "NODE_PINFEED");
    let tie_vcc = b.add_wire(clb, "TIE_VCC", "PSEUDO_VCC");
    let tie_gnd = b.add_wire(clb, "TIE_GND", "PSEUDO_GND");
    let a1_in = b.add_wire(clb, "A1_IN", "NODE_PINFEED");
    let a2_in = b.add_wire(clb, "A2_IN", "NODE_PINFEED");
    b.add_pip(clb, leaf, ck_in);
    b.add_pip(clb, long, ck_in);
    b.add_pip(clb, tie_vcc, a1_in);
    b.add_pip(clb, tie_gnd, a2_in);
    let lut = b.add_bel(clb, "A6LUT", "SLICE_LUTX", 0, Some(0));
    b.add_bel_pin(clb, lut, "A1", a1_in, PinDir::Input);
    b.add_bel_pin(clb, lut, "A2", a2_in, PinDir::Input);
    let ff = b.add_bel(clb, "AFF", "SLICE_FFX", 2, Some(0));
    b.add_bel_pin(clb, ff, "CK", ck_in, PinDir::Input);

    let int = b.add_tile_type("INT_L");
    let single = b.add_wire(int, "SINGLE_IN", "NODE_SINGLE");
    let imux = b.add_wire(int, "IMUX_OUT", "NODE_PINFEED");
    b.add_pip(int, single, imux);

    let t0 = b.set_tile(0, 0, "CLK_BUFG_TOP_R_X0Y0", bufg);
    b.add_site(t0, "BUFGCTRL_X0Y0", "BUFGCTRL", "", None);
    let t1 = b.set_tile(1, 0, "CLK_HROW_TOP_R_X1Y0", hrow);
    let t2 = b.set_tile(2, 0, "CLBLL_L_X2Y0", clb);
    b.add_site(t2, "SLICE_X0Y0", "SLICEL", "", None);
    let t3 = b.set_tile(3, 0, "CLBLL_L_X3Y0", clb);
    b.add_site(t3, "SLICE_X1Y0", "SLICEL", "", None);
    let t4 = b.set_tile(4, 0, "INT_L_X4Y0", int);

    b.add_node("NODE_GLOBAL_BUFG", &[(t0, bufg_o), (t1, hrow_in)]);
    b.add_node("NODE_GLOBAL_LEAF", &[(t1, hrow_out), (t2, leaf)]);
    b.add_node("NODE_HLONG", &[(t1, hlong), (t3, long)]);
    b.add_node("PSEUDO_VCC", &[(t1, vcc_wire), (t2, tie_vcc), (t3, tie_vcc)]);
    b.add_node("PSEUDO_GND", &[(t1, gnd_wire), (t2, tie_gnd), (t3, tie_gnd)]);
    b.add_node("NODE_PINFEED", &[(t0, bufg_imux), (t4, imux)]);
    b.finish()
}

// ---------------------------------------------------------------------------
// Timed slices
// ---------------------------------------------------------------------------

/// Two `CLBLL_L` slices at x=0 and x=2 with LUTs and flip-flops in two
/// 16-slot clusters. The bels of `A6LUT`/`A5LUT` share a timing instance.
pub fn timing_device() -> Device {
    let mut b = ChipDbBuilder::new("xc7timing", 3, 1);
    let clb = b.add_tile_type("CLBLL_L");
    let a6 = b.add_bel(clb, "A6LUT", "SLICE_LUTX", 0, Some(0));
    let a5 = b.add_bel(clb, "A5LUT", "SLICE_LUTX", 1, Some(0));
    b.add_bel(clb, "AFF", "SLICE_FFX", 3, Some(0));
    b.add_bel(clb, "CARRY4", "CARRY4", 15, Some(0));
    b.add_bel(clb, "B6LUT", "SLICE_LUTX", 16, Some(0));
    b.add_bel(clb, "BFF2", "SLICE_FFX", 19, Some(0));

    let inst = b.add_timing_instance(clb);
    b.set_bel_timing_inst(clb, a6, inst);
    b.set_bel_timing_inst(clb, a5, inst);
    b.add_cell_delay(clb, inst, "LUT6", "A1", "O6", 124);
    b.add_cell_delay(clb, inst, "LUT6", "A2", "O6", 131);
    b.add_cell_delay(clb, inst, "LUT5", "A5", "O5", 98);

    let t0 = b.set_tile(0, 0, "CLBLL_L_X0Y0", clb);
    b.add_site(t0, "SLICE_X0Y0", "SLICEL", "", None);
    let t2 = b.set_tile(2, 0, "CLBLL_L_X2Y0", clb);
    b.add_site(t2, "SLICE_X1Y0", "SLICEL", "", None);
    open(b.finish())
}

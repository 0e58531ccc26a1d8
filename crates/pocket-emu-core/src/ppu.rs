use crate::{
    interrupts::{self, Interrupt},
    mmu::Mmu,
};

// Screen resolution used by the Game Boy PPU
pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;
const SCREEN_PIXELS: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

// Timing constants in clock cycles
pub const LINE_CYCLES: i32 = 456;
const MODE2_CYCLES: i32 = 80; // OAM scan
const MODE3_CYCLES: i32 = 172; // Pixel transfer

const VBLANK_START: u8 = 144;
const LAST_LINE: u8 = 153;

const TOTAL_SPRITES: u16 = 40;
const OAM_BASE: u16 = 0xFE00;

// VRAM layout
const BG_MAP_0_BASE: u16 = 0x9800;
const BG_MAP_1_BASE: u16 = 0x9C00;
const TILE_DATA_UNSIGNED: u16 = 0x8000;
const TILE_DATA_SIGNED: i32 = 0x9000;

// LCDC bits
const LCDC_BG_ENABLE: u8 = 0x01;
const LCDC_OBJ_ENABLE: u8 = 0x02;
const LCDC_OBJ_TALL: u8 = 0x04;
const LCDC_BG_MAP: u8 = 0x08;
const LCDC_TILE_DATA: u8 = 0x10;
const LCDC_WINDOW_ENABLE: u8 = 0x20;
const LCDC_WINDOW_MAP: u8 = 0x40;
const LCDC_LCD_ENABLE: u8 = 0x80;

// STAT bits
const STAT_MODE_MASK: u8 = 0x03;
const STAT_COINCIDENCE: u8 = 0x04;
const STAT_HBLANK_IRQ: u8 = 0x08;
const STAT_VBLANK_IRQ: u8 = 0x10;
const STAT_OAM_IRQ: u8 = 0x20;
const STAT_LYC_IRQ: u8 = 0x40;

// Sprite attribute flags
const OBJ_BEHIND_BG: u8 = 0x80;
const OBJ_FLIP_Y: u8 = 0x40;
const OBJ_FLIP_X: u8 = 0x20;
const OBJ_PALETTE_1: u8 = 0x10;

// LCD modes used in the `mode` field
pub const MODE_HBLANK: u8 = 0;
pub const MODE_VBLANK: u8 = 1;
pub const MODE_OAM: u8 = 2;
pub const MODE_TRANSFER: u8 = 3;

/// Four-gray output palette in 0x00RRGGBB order, lightest first.
pub const GRAY_SHADES: [u32; 4] = [0x00FFFFFF, 0x00C6C6C6, 0x007F7F7F, 0x00000000];

/// A finished 160x144 picture of 2-bit shades.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Box<[u8; SCREEN_PIXELS]>,
}

impl Frame {
    pub fn new() -> Self {
        Self {
            pixels: Box::new([0; SCREEN_PIXELS]),
        }
    }

    /// Shade 0-3 at (x, y), 0 being the lightest.
    pub fn shade(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * SCREEN_WIDTH + x]
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels[..]
    }

    /// Opaque 0xAARRGGBB pixels, row-major.
    pub fn to_argb(&self) -> Vec<u32> {
        self.pixels
            .iter()
            .map(|&s| 0xFF00_0000 | GRAY_SHADES[s as usize & 0x03])
            .collect()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &SCREEN_WIDTH)
            .field("height", &SCREEN_HEIGHT)
            .finish()
    }
}

pub struct Ppu {
    /// Cycles left in the current scanline.
    pub line_counter: i32,
    pub mode: u8,
    /// Visible lines rendered since LY last wrapped to 0.
    pub lines_rendered: u16,
    /// Last LY==LYC result, for edge detection.
    pub coincidence: bool,

    background: Box<[u8; SCREEN_PIXELS]>,
    window: Box<[Option<u8>; SCREEN_PIXELS]>,
    sprites: Box<[Option<u8>; SCREEN_PIXELS]>,
    frame: Frame,
    /// Indicates a completed frame is available in `frame`
    frame_ready: bool,
}

impl Ppu {
    /// Matches the post-boot STAT value (mode 1, coincidence set).
    pub fn new() -> Self {
        Self {
            line_counter: LINE_CYCLES,
            mode: MODE_VBLANK,
            lines_rendered: 0,
            coincidence: true,
            background: Box::new([0; SCREEN_PIXELS]),
            window: Box::new([None; SCREEN_PIXELS]),
            sprites: Box::new([None; SCREEN_PIXELS]),
            frame: Frame::new(),
            frame_ready: false,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_ready(&self) -> bool {
        self.frame_ready
    }

    pub fn clear_frame_flag(&mut self) {
        self.frame_ready = false;
    }

    pub fn background_pixel(&self, x: usize, y: usize) -> u8 {
        self.background[y * SCREEN_WIDTH + x]
    }

    /// `None` where the window does not cover the pixel.
    pub fn window_pixel(&self, x: usize, y: usize) -> Option<u8> {
        self.window[y * SCREEN_WIDTH + x]
    }

    /// `None` where no sprite pixel was drawn.
    pub fn sprite_pixel(&self, x: usize, y: usize) -> Option<u8> {
        self.sprites[y * SCREEN_WIDTH + x]
    }

    /// Advance the LCD by `cycles` clock cycles.
    pub fn advance(&mut self, cycles: u32, mmu: &mut Mmu) {
        if mmu.lcdc() & LCDC_LCD_ENABLE == 0 {
            self.line_counter = LINE_CYCLES;
            self.lines_rendered = 0;
            self.mode = MODE_HBLANK;
            mmu.set_ly(0);
            mmu.set_stat(mmu.stat() & !STAT_MODE_MASK);
            return;
        }

        self.line_counter -= cycles as i32;
        while self.line_counter <= 0 {
            self.line_counter += LINE_CYCLES;
            self.next_line(mmu);
        }

        self.update_mode(mmu);
        self.update_coincidence(mmu);
    }

    fn next_line(&mut self, mmu: &mut Mmu) {
        let mut ly = mmu.ly().wrapping_add(1);
        if ly > LAST_LINE {
            ly = 0;
            self.lines_rendered = 0;
        }
        mmu.set_ly(ly);

        if ly == VBLANK_START {
            interrupts::request(mmu, Interrupt::VBlank);
            if self.lines_rendered <= SCREEN_HEIGHT as u16 {
                self.render_frame(mmu);
            }
        }
        self.update_coincidence(mmu);
    }

    fn update_mode(&mut self, mmu: &mut Mmu) {
        let ly = mmu.ly();
        let elapsed = LINE_CYCLES - self.line_counter;
        let mode = if ly >= VBLANK_START {
            MODE_VBLANK
        } else if elapsed < MODE2_CYCLES {
            MODE_OAM
        } else if elapsed < MODE2_CYCLES + MODE3_CYCLES {
            MODE_TRANSFER
        } else {
            MODE_HBLANK
        };
        if mode == self.mode {
            return;
        }
        self.mode = mode;

        let stat = (mmu.stat() & !STAT_MODE_MASK) | mode;
        mmu.set_stat(stat);

        let irq_enable = match mode {
            MODE_HBLANK => {
                if (ly as usize) < SCREEN_HEIGHT && self.lines_rendered < SCREEN_HEIGHT as u16 {
                    self.render_background_line(ly as usize, mmu);
                    self.render_window_line(ly as usize, mmu);
                    self.lines_rendered += 1;
                }
                STAT_HBLANK_IRQ
            }
            MODE_VBLANK => STAT_VBLANK_IRQ,
            MODE_OAM => STAT_OAM_IRQ,
            _ => 0,
        };
        if stat & irq_enable != 0 {
            interrupts::request(mmu, Interrupt::LcdStat);
        }
    }

    fn update_coincidence(&mut self, mmu: &mut Mmu) {
        let equal = mmu.ly() == mmu.lyc();
        let stat = if equal {
            mmu.stat() | STAT_COINCIDENCE
        } else {
            mmu.stat() & !STAT_COINCIDENCE
        };
        mmu.set_stat(stat);
        if equal && !self.coincidence && stat & STAT_LYC_IRQ != 0 {
            interrupts::request(mmu, Interrupt::LcdStat);
        }
        self.coincidence = equal;
    }

    #[inline(always)]
    fn dmg_shade(palette: u8, color_id: u8) -> u8 {
        (palette >> (color_id * 2)) & 0x03
    }

    fn tile_data_addr(lcdc: u8, tile_index: u8) -> u16 {
        if lcdc & LCDC_TILE_DATA != 0 {
            TILE_DATA_UNSIGNED + tile_index as u16 * 16
        } else {
            (TILE_DATA_SIGNED + tile_index as i8 as i32 * 16) as u16
        }
    }

    /// 2-bit color of one tile pixel; `col` 0 is the leftmost (MSB).
    fn tile_color(mmu: &Mmu, tile_addr: u16, row: u16, col: u8) -> u8 {
        let lo = mmu.read_byte(tile_addr + row * 2);
        let hi = mmu.read_byte(tile_addr + row * 2 + 1);
        let bit = 7 - col;
        (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1)
    }

    pub fn render_background_line(&mut self, ly: usize, mmu: &Mmu) {
        let lcdc = mmu.lcdc();
        let row = &mut self.background[ly * SCREEN_WIDTH..(ly + 1) * SCREEN_WIDTH];
        if lcdc & LCDC_BG_ENABLE == 0 {
            row.fill(0);
            return;
        }

        let map_base = if lcdc & LCDC_BG_MAP != 0 {
            BG_MAP_1_BASE
        } else {
            BG_MAP_0_BASE
        };
        let bgp = mmu.bgp();
        let y = (ly as u8).wrapping_add(mmu.scy()) as u16;
        let scx = mmu.scx();
        for (x, pixel) in row.iter_mut().enumerate() {
            let px = (x as u8).wrapping_add(scx);
            let tile_index = mmu.read_byte(map_base + (y / 8) * 32 + (px / 8) as u16);
            let addr = Self::tile_data_addr(lcdc, tile_index);
            let color = Self::tile_color(mmu, addr, y % 8, px % 8);
            *pixel = Self::dmg_shade(bgp, color);
        }
    }

    pub fn render_window_line(&mut self, ly: usize, mmu: &Mmu) {
        let lcdc = mmu.lcdc();
        let wy = mmu.wy() as usize;
        let row = &mut self.window[ly * SCREEN_WIDTH..(ly + 1) * SCREEN_WIDTH];
        row.fill(None);
        if lcdc & LCDC_WINDOW_ENABLE == 0 || ly < wy {
            return;
        }

        let map_base = if lcdc & LCDC_WINDOW_MAP != 0 {
            BG_MAP_1_BASE
        } else {
            BG_MAP_0_BASE
        };
        let bgp = mmu.bgp();
        let wy_line = (ly - wy) as u16;
        let origin = mmu.wx() as i32 - 7;
        for (x, pixel) in row.iter_mut().enumerate() {
            let wx_pixel = x as i32 - origin;
            if !(0..256).contains(&wx_pixel) {
                continue;
            }
            let wx_pixel = wx_pixel as u16;
            let tile_index = mmu.read_byte(map_base + (wy_line / 8) * 32 + wx_pixel / 8);
            let addr = Self::tile_data_addr(lcdc, tile_index);
            let color = Self::tile_color(mmu, addr, wy_line % 8, (wx_pixel % 8) as u8);
            *pixel = Some(Self::dmg_shade(bgp, color));
        }
    }

    /// Draw all 40 OAM entries, slot 39 first so slot 0 ends up on top.
    pub fn render_sprites(&mut self, mmu: &Mmu) {
        self.sprites.fill(None);
        let lcdc = mmu.lcdc();
        if lcdc & LCDC_OBJ_ENABLE == 0 {
            return;
        }

        let tall = lcdc & LCDC_OBJ_TALL != 0;
        let height: i32 = if tall { 16 } else { 8 };
        for slot in (0..TOTAL_SPRITES).rev() {
            let base = OAM_BASE + slot * 4;
            let y = mmu.read_byte(base) as i32 - 16;
            let x = mmu.read_byte(base + 1) as i32 - 8;
            let tile = mmu.read_byte(base + 2);
            let flags = mmu.read_byte(base + 3);
            let palette = if flags & OBJ_PALETTE_1 != 0 {
                mmu.obp1()
            } else {
                mmu.obp0()
            };

            for row in 0..height {
                let sy = y + row;
                if !(0..SCREEN_HEIGHT as i32).contains(&sy) {
                    continue;
                }
                let line = if flags & OBJ_FLIP_Y != 0 {
                    height - 1 - row
                } else {
                    row
                };
                let tile_num = match (tall, line < 8) {
                    (true, true) => tile & 0xFE,
                    (true, false) => tile | 0x01,
                    (false, _) => tile,
                };
                let addr = TILE_DATA_UNSIGNED + tile_num as u16 * 16;

                for col in 0..8 {
                    let sx = x + col;
                    if !(0..SCREEN_WIDTH as i32).contains(&sx) {
                        continue;
                    }
                    let bit_col = if flags & OBJ_FLIP_X != 0 { 7 - col } else { col };
                    let color = Self::tile_color(mmu, addr, (line % 8) as u16, bit_col as u8);
                    if color == 0 {
                        continue;
                    }
                    let idx = sy as usize * SCREEN_WIDTH + sx as usize;
                    if flags & OBJ_BEHIND_BG != 0 && self.bg_window_shade(idx) != 0 {
                        continue;
                    }
                    self.sprites[idx] = Some(Self::dmg_shade(palette, color));
                }
            }
        }
    }

    #[inline]
    fn bg_window_shade(&self, idx: usize) -> u8 {
        self.window[idx].unwrap_or(self.background[idx])
    }

    /// Sprites over window over background.
    fn compose(&mut self) {
        for idx in 0..SCREEN_PIXELS {
            let shade = self.sprites[idx].unwrap_or_else(|| self.bg_window_shade(idx));
            self.frame.pixels[idx] = shade;
        }
    }

    fn render_frame(&mut self, mmu: &Mmu) {
        self.render_sprites(mmu);
        self.compose();
        self.frame_ready = true;
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}
